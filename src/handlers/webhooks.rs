// src/handlers/webhooks.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        messaging::{FileUploadedPayload, InboundMessagePayload, MilestoneCompletePayload, NewMessage},
        tenancy::TenantScope,
    },
    services::whatsapp::notify_best_effort,
};

// POST /api/n8n/receive
// Tenant resolvido pelo número de negócio que recebeu a mensagem.
#[utoipa::path(
    post,
    path = "/api/n8n/receive",
    tag = "Webhooks",
    request_body = InboundMessagePayload,
    responses(
        (status = 200, description = "Mensagem gravada (ou ignorada com aviso se o número não pertence a nenhum tenant)"),
        (status = 400, description = "from ou text ausentes"),
        (status = 401, description = "Segredo do webhook inválido")
    ),
    security(("webhook_secret" = []))
)]
pub async fn receive_message(
    State(app_state): State<AppState>,
    Json(payload): Json<InboundMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let Some(tenant) = app_state
        .tenant_service
        .resolve_by_whatsapp_number(&payload.to)
        .await?
    else {
        // 200 para o n8n não ficar reenviando; nada é gravado.
        tracing::warn!(to = %payload.to, "Mensagem para número sem tenant ativo, descartada");
        return Ok((
            StatusCode::OK,
            Json(json!({
                "success": false,
                "warning": "No active tenant for destination number; message not stored",
            })),
        ));
    };

    let scope = TenantScope::from(&tenant);
    let now = Utc::now();

    // Sem message_id, gera um id único (o id é chave primária global).
    let message = NewMessage {
        id: payload
            .message_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("n8n_{}", Uuid::new_v4())),
        from_number: payload.from,
        to_number: payload.to,
        text: payload.text,
        timestamp: payload.timestamp.unwrap_or_else(|| now.timestamp()),
        message_type: payload.message_type.unwrap_or_else(|| "text".to_string()),
        status: if payload.is_sent { "sent" } else { "received" }.to_string(),
        is_sent: payload.is_sent,
    };

    let inserted = app_state.message_repo.insert_if_absent(&scope, &message).await?;
    if inserted {
        tracing::info!(tenant = %tenant.slug, id = %message.id, "📥 Mensagem recebida do n8n");
    } else {
        tracing::debug!(id = %message.id, "Mensagem duplicada ignorada");
    }

    Ok((StatusCode::OK, Json(json!({ "success": true, "id": message.id }))))
}

// POST /api/webhooks/milestone-complete
#[utoipa::path(
    post,
    path = "/api/webhooks/milestone-complete",
    tag = "Webhooks",
    request_body = MilestoneCompletePayload,
    responses(
        (status = 200, description = "Marco registrado"),
        (status = 400, description = "Campos ausentes ou tenant desconhecido"),
        (status = 401, description = "Segredo do webhook inválido")
    ),
    security(("webhook_secret" = []))
)]
pub async fn milestone_complete(
    State(app_state): State<AppState>,
    Json(payload): Json<MilestoneCompletePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tenant = app_state
        .tenant_service
        .resolve_by_slug(payload.tenant_slug.as_deref())
        .await?
        .ok_or(AppError::UnknownTenant)?;
    let scope = TenantScope::from(&tenant);

    let milestone_id = app_state
        .milestone_repo
        .insert_completed(&scope, &payload.client_phone, &payload.milestone_title, Utc::now())
        .await?;

    tracing::info!(
        tenant = %tenant.slug,
        title = %payload.milestone_title,
        new = milestone_id.is_some(),
        "🏁 Marco concluído"
    );

    if payload.notify_whatsapp {
        let body = format!(
            "Hi {}! Great news \u{2014} your milestone \"*{}*\" has been completed. Log in to your client portal to see the latest updates.",
            greeting_name(payload.client_name.as_deref(), &payload.client_phone),
            payload.milestone_title,
        );
        notify_best_effort(app_state.whatsapp.as_ref(), &payload.client_phone, &body).await;
    }

    Ok(Json(json!({ "success": true, "milestone_id": milestone_id })))
}

// POST /api/webhooks/file-uploaded
#[utoipa::path(
    post,
    path = "/api/webhooks/file-uploaded",
    tag = "Webhooks",
    request_body = FileUploadedPayload,
    responses(
        (status = 200, description = "Arquivo registrado"),
        (status = 400, description = "Campos ausentes ou tenant desconhecido"),
        (status = 401, description = "Segredo do webhook inválido")
    ),
    security(("webhook_secret" = []))
)]
pub async fn file_uploaded(
    State(app_state): State<AppState>,
    Json(payload): Json<FileUploadedPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tenant = app_state
        .tenant_service
        .resolve_by_slug(payload.tenant_slug.as_deref())
        .await?
        .ok_or(AppError::UnknownTenant)?;
    let scope = TenantScope::from(&tenant);

    let file_id = app_state
        .file_repo
        .insert(&scope, &payload.client_phone, &payload.file_name, &payload.file_url)
        .await?;

    tracing::info!(tenant = %tenant.slug, file = %payload.file_name, "📎 Arquivo registrado");

    if payload.notify_whatsapp {
        let body = format!(
            "Hi {}! 📁 A new file has been uploaded to your project: *{}*. You can view and download it from your client portal.",
            greeting_name(payload.client_name.as_deref(), &payload.client_phone),
            payload.file_name,
        );
        notify_best_effort(app_state.whatsapp.as_ref(), &payload.client_phone, &body).await;
    }

    Ok(Json(json!({ "success": true, "file_id": file_id })))
}

// Sem nome, a saudação usa o próprio telefone
fn greeting_name<'a>(client_name: Option<&'a str>, client_phone: &'a str) -> &'a str {
    client_name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(client_phone)
}
