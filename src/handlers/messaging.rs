// src/handlers/messaging.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedAdmin,
    models::{
        messaging::{MessageSummary, MessagesQuery, SendMessagePayload},
        tenancy::TenantScope,
    },
};

const DEFAULT_MESSAGES_LIMIT: i64 = 500;
const MAX_MESSAGES_LIMIT: i64 = 1000;

// GET /api/messages
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    params(
        ("limit" = Option<i64>, Query, description = "Máximo de mensagens (padrão 500, teto 1000)")
    ),
    responses(
        (status = 200, description = "Mensagens do tenant, mais recentes primeiro"),
        (status = 401, description = "Sem sessão")
    ),
    security(("admin_cookie" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    tenant: TenantScope,
    Query(query): Query<MessagesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_MESSAGES_LIMIT)
        .clamp(1, MAX_MESSAGES_LIMIT);

    let messages: Vec<MessageSummary> = app_state
        .message_repo
        .list_recent(&tenant, limit)
        .await?
        .into_iter()
        .map(MessageSummary::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": messages.len(),
        "messages": messages,
    })))
}

// POST /api/send-message
#[utoipa::path(
    post,
    path = "/api/send-message",
    tag = "Messages",
    request_body = SendMessagePayload,
    responses(
        (status = 200, description = "Mensagem aceita pela WhatsApp Cloud API"),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 401, description = "Sem sessão"),
        (status = 500, description = "Erro da WhatsApp API ou credenciais ausentes")
    ),
    security(("admin_cookie" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let data = app_state.whatsapp.send_text(&payload.to, &payload.message).await?;

    let message_id = data
        .pointer("/messages/0/id")
        .and_then(|id| id.as_str())
        .map(str::to_string);

    tracing::info!(tenant_id = %admin.tenant_id, to = %payload.to, "📤 Mensagem enviada");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": data,
            "messageId": message_id,
        })),
    ))
}

// GET /api/verify-phone
#[utoipa::path(
    get,
    path = "/api/verify-phone",
    tag = "Messages",
    responses(
        (status = 200, description = "Status do número de negócio"),
        (status = 401, description = "Sem sessão"),
        (status = 500, description = "Erro da WhatsApp API ou credenciais ausentes")
    ),
    security(("admin_cookie" = []))
)]
pub async fn verify_phone(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, AppError> {
    let data = app_state.whatsapp.phone_status().await?;

    Ok(Json(json!({ "success": true, "data": data })))
}
