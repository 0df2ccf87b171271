// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::{auth::AuthContext, tenancy::TenantScope},
};

// O tenant vem SEMPRE da sessão validada pelo `auth_guard`, nunca de um
// cabeçalho ou parâmetro enviado pelo cliente.
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .map(TenantScope::from)
            .ok_or(AppError::NotAuthenticated)
    }
}
