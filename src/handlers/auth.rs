// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthMessageResponse, LoginPayload, SessionStatusResponse},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada (cookie admin_token)", body = AuthMessageResponse),
        (status = 400, description = "E-mail ou senha ausentes"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (token, _ctx) = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    let cookie = app_state.auth_service.session_cookie(&token);

    Ok((
        jar.add(cookie),
        Json(AuthMessageResponse {
            success: true,
            message: "Login successful".into(),
        }),
    ))
}

// POST /api/auth/logout
// Sem lista de revogação: o token só deixa de ser enviado pelo navegador.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Cookie de sessão apagado", body = AuthMessageResponse)
    )
)]
pub async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    // `add` em vez de `remove`: o cookie de remoção sai mesmo sem sessão na requisição
    let cookie = app_state.auth_service.clear_session_cookie();

    (
        jar.add(cookie),
        Json(AuthMessageResponse {
            success: true,
            message: "Logged out successfully".into(),
        }),
    )
}

// GET /api/auth/verify
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão válida", body = SessionStatusResponse),
        (status = 401, description = "Sem sessão", body = SessionStatusResponse)
    ),
    security(("admin_cookie" = []))
)]
pub async fn verify(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    match app_state.auth_service.auth_payload(&jar) {
        Some(ctx) => (
            StatusCode::OK,
            Json(SessionStatusResponse {
                success: true,
                authenticated: true,
                tenant_id: Some(ctx.tenant_id),
                tenant_slug: ctx.tenant_slug,
                role: Some(ctx.role),
                email: ctx.email,
            }),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionStatusResponse {
                success: false,
                authenticated: false,
                tenant_id: None,
                tenant_slug: None,
                role: None,
                email: None,
            }),
        ),
    }
}
