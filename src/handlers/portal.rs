// src/handlers/portal.rs

use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        portal::{IssueMagicLinkPayload, IssueMagicLinkResponse, PortalQuery, PortalResponse},
        tenancy::TenantScope,
    },
    services::portal::MagicLinkRequest,
};

// POST /api/portal/generate-link (admin)
#[utoipa::path(
    post,
    path = "/api/portal/generate-link",
    tag = "Portal",
    request_body = IssueMagicLinkPayload,
    responses(
        (status = 200, description = "Magic link emitido", body = IssueMagicLinkResponse),
        (status = 400, description = "client_phone ausente"),
        (status = 401, description = "Sem sessão")
    ),
    security(("admin_cookie" = []))
)]
pub async fn generate_link(
    State(app_state): State<AppState>,
    tenant: TenantScope,
    headers: HeaderMap,
    Json(payload): Json<IssueMagicLinkPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Valida antes de qualquer efeito colateral
    payload.validate()?;

    let base_url = portal_base_url(&app_state, &headers)?;

    let issued = app_state
        .portal_service
        .issue_magic_link(
            &tenant,
            MagicLinkRequest {
                client_phone: payload.client_phone,
                client_name: payload.client_name,
                client_email: payload.client_email,
            },
            &base_url,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(IssueMagicLinkResponse {
            success: true,
            url: issued.url,
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}

// GET /api/portal/verify-link?token=... (público, sem sessão)
#[utoipa::path(
    get,
    path = "/api/portal/verify-link",
    tag = "Portal",
    params(
        ("token" = String, Query, description = "Token do magic link")
    ),
    responses(
        (status = 200, description = "Dados do portal do cliente", body = PortalResponse),
        (status = 400, description = "token ausente"),
        (status = 404, description = "Link não encontrado"),
        (status = 410, description = "Link expirado")
    )
)]
pub async fn verify_link(
    State(app_state): State<AppState>,
    Query(query): Query<PortalQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("token is required".into()))?;

    let view = app_state.portal_service.resolve_portal(token.trim()).await?;

    Ok((StatusCode::OK, Json(PortalResponse { success: true, view })))
}

// PORTAL_BASE_URL tem prioridade; sem ele, usa o Host da própria requisição.
fn portal_base_url(app_state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(base) = &app_state.config.portal_base_url {
        return Ok(base.clone());
    }

    headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| format!("https://{host}"))
        .ok_or_else(|| AppError::Configuration("PORTAL_BASE_URL não definido e requisição sem Host".into()))
}
