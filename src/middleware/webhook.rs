// src/middleware/webhook.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::{common::error::AppError, config::AppState};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

// Autenticação servidor-a-servidor (n8n, portal externo) por segredo estático.
// Sem WEBHOOK_SECRET configurado, as chamadas passam (aviso no startup).
pub async fn webhook_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(secret) = &app_state.config.webhook_secret {
        let provided = request
            .headers()
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        if !secret_matches(provided, secret.expose_secret()) {
            tracing::warn!(path = %request.uri().path(), "Webhook rejeitado: segredo inválido");
            return Err(AppError::WebhookUnauthorized);
        }
    }

    Ok(next.run(request).await)
}

// Comparação em tempo constante; cabeçalho ausente nunca confere.
fn secret_matches(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(value) => bool::from(value.as_bytes().ct_eq(expected.as_bytes())),
        None => false,
    }
}
