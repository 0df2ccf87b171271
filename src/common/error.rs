// src/common/error.rs

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// O nosso tipo de erro único. Cada handler devolve `Result<_, AppError>`
// e a conversão para HTTP acontece num só lugar (o `IntoResponse` abaixo).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Tenant desconhecido")]
    UnknownTenant,

    // Sessão ausente, inválida, expirada ou assinada com outro segredo.
    // Os motivos NÃO são distinguidos para o cliente.
    #[error("Não autenticado")]
    NotAuthenticated,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Segredo de webhook inválido")]
    WebhookUnauthorized,

    #[error("Magic link não encontrado")]
    MagicLinkNotFound,

    #[error("Magic link expirado")]
    MagicLinkExpired,

    #[error("Erro de configuração: {0}")]
    Configuration(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro da WhatsApp API: {0}")]
    WhatsApp(String),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::UnknownTenant => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotAuthenticated
            | AppError::InvalidCredentials
            | AppError::WebhookUnauthorized => StatusCode::UNAUTHORIZED,
            AppError::MagicLinkNotFound => StatusCode::NOT_FOUND,
            AppError::MagicLinkExpired => StatusCode::GONE,
            // Pool esgotado é transitório: o cliente pode tentar de novo.
            AppError::DatabaseError(sqlx::Error::PoolTimedOut) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            // Retorna todos os detalhes da validação, com a primeira mensagem em "error".
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let first = details
                    .values()
                    .flat_map(|messages| messages.first())
                    .next()
                    .cloned()
                    .unwrap_or_else(|| "Invalid request".to_string());
                let body = Json(json!({
                    "success": false,
                    "error": first,
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::BadRequest(message) => message,
            AppError::UnknownTenant => "Unknown tenant".to_string(),
            AppError::NotAuthenticated => "Not authenticated".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::WebhookUnauthorized => "Unauthorized".to_string(),
            AppError::MagicLinkNotFound => "Link not found".to_string(),
            AppError::MagicLinkExpired => "Link has expired".to_string(),

            // Configuração: detalhe só no log, nunca para o cliente.
            AppError::Configuration(detail) => {
                tracing::error!("🔥 Erro de configuração: {}", detail);
                "Server configuration error".to_string()
            }

            AppError::DatabaseError(sqlx::Error::PoolTimedOut) => {
                tracing::warn!("⏳ Pool de conexões esgotado");
                let body = Json(json!({
                    "success": false,
                    "error": "Database busy, try again",
                }));
                return (status, [(header::RETRY_AFTER, "1")], body).into_response();
            }

            // Falhas de dependências externas levam a mensagem original
            // para o operador conseguir diagnosticar.
            AppError::DatabaseError(e) => {
                tracing::error!("🔥 Erro de banco de dados: {:?}", e);
                e.to_string()
            }
            AppError::WhatsApp(message) => {
                tracing::error!("🔥 Erro da WhatsApp API: {}", message);
                message
            }

            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}
