// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{common::error::AppError, config::AppState, models::auth::AuthContext};

// O middleware em si: sem sessão válida, responde 401 e o handler nunca roda.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = app_state.auth_service.require_auth(&jar)?;

    // Insere o contexto nos "extensions" da requisição
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

// Extrator para obter o admin autenticado diretamente nos handlers
pub struct AuthenticatedAdmin(pub AuthContext);

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthenticatedAdmin)
            .ok_or(AppError::NotAuthenticated)
    }
}
