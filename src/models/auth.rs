// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

/// Papel atribuído às sessões legadas (tokens anteriores ao multi-tenant).
pub const LEGACY_ROLE: &str = "agency_admin";

// Linha de `users` + `tenants` usada só pelo login
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub tenant_id: Uuid,
    pub tenant_slug: String,
}

/// Contexto autenticado de um admin, recuperado do cookie de sessão.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: Option<Uuid>,
    pub tenant_id: Uuid,
    pub tenant_slug: Option<String>,
    pub email: Option<String>,
    pub role: String,
}

// Dados para login. Campos ausentes viram string vazia para que a
// validação responda 400 com a mensagem certa (e não um 422 do serde).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "email and password are required"))]
    #[schema(example = "admin@acme.com")]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "email and password are required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthMessageResponse {
    pub success: bool,
    pub message: String,
}

// Resposta do GET /api/auth/verify
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub success: bool,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
