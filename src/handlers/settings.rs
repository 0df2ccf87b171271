// src/handlers/settings.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        messaging::{
            ConversationQuery, ConversationSettings, ConversationSettingsPayload,
            DEFAULT_AUTO_REPLY_MESSAGE,
        },
        tenancy::TenantScope,
    },
};

// GET /api/auto-reply-status
#[utoipa::path(
    get,
    path = "/api/auto-reply-status",
    tag = "Settings",
    responses(
        (status = 200, description = "Estado da resposta automática do tenant"),
        (status = 401, description = "Sem sessão")
    ),
    security(("admin_cookie" = []))
)]
pub async fn get_auto_reply_status(
    State(app_state): State<AppState>,
    tenant: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let enabled = app_state.settings_repo.auto_reply_enabled(&tenant).await?;

    Ok(Json(json!({ "enabled": enabled })))
}

// POST /api/auto-reply-status
// O corpo é lido como JSON livre para responder 400 (e não 422) a tipos errados.
#[utoipa::path(
    post,
    path = "/api/auto-reply-status",
    tag = "Settings",
    responses(
        (status = 200, description = "Resposta automática atualizada"),
        (status = 400, description = "enabled não é booleano"),
        (status = 401, description = "Sem sessão")
    ),
    security(("admin_cookie" = []))
)]
pub async fn set_auto_reply_status(
    State(app_state): State<AppState>,
    tenant: TenantScope,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let enabled = body
        .get("enabled")
        .and_then(Value::as_bool)
        .ok_or_else(|| AppError::BadRequest("enabled must be a boolean".into()))?;

    app_state.settings_repo.set_auto_reply_enabled(&tenant, enabled).await?;
    tracing::info!(tenant_id = %tenant.tenant_id(), enabled, "Resposta automática alterada");

    Ok(Json(json!({ "success": true, "enabled": enabled })))
}

// GET /api/conversations/settings?contact=...
#[utoipa::path(
    get,
    path = "/api/conversations/settings",
    tag = "Settings",
    params(
        ("contact" = String, Query, description = "Telefone do contato")
    ),
    responses(
        (status = 200, description = "Configurações da conversa (ou o padrão)"),
        (status = 400, description = "contact ausente"),
        (status = 401, description = "Sem sessão")
    ),
    security(("admin_cookie" = []))
)]
pub async fn get_conversation_settings(
    State(app_state): State<AppState>,
    tenant: TenantScope,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let contact = query
        .contact
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Contact parameter is required".into()))?;

    let settings = app_state
        .settings_repo
        .conversation_settings(&tenant, &contact)
        .await?
        .unwrap_or_else(|| ConversationSettings::default_for(&contact));

    Ok(Json(json!({ "success": true, "settings": settings })))
}

// POST|PUT /api/conversations/settings
#[utoipa::path(
    post,
    path = "/api/conversations/settings",
    tag = "Settings",
    request_body = ConversationSettingsPayload,
    responses(
        (status = 200, description = "Configurações salvas"),
        (status = 400, description = "phone_number ausente"),
        (status = 401, description = "Sem sessão")
    ),
    security(("admin_cookie" = []))
)]
pub async fn save_conversation_settings(
    State(app_state): State<AppState>,
    tenant: TenantScope,
    Json(payload): Json<ConversationSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let settings = ConversationSettings {
        phone_number: payload.phone_number,
        auto_reply_enabled: payload.auto_reply_enabled.unwrap_or(false),
        auto_reply_message: payload
            .auto_reply_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTO_REPLY_MESSAGE.to_string()),
        updated_at: None,
    };

    let saved = app_state
        .settings_repo
        .upsert_conversation_settings(&tenant, &settings)
        .await?;

    Ok(Json(json!({ "success": true, "settings": saved })))
}
