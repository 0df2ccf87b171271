// src/models/portal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::messaging::{ClientFile, Message, Milestone};

// ---
// 1. MagicLink (O "Acesso compartilhável")
// ---
// O token é a única credencial: quem o possui, acessa.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MagicLink {
    pub token: String,
    pub tenant_id: Uuid,
    pub client_phone: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MagicLink {
    /// Expirado só depois do instante de expiração (o próprio instante ainda vale).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// Registro a inserir. O tenant vem do `TenantScope`, nunca daqui.
#[derive(Debug, Clone)]
pub struct NewMagicLink {
    pub token: String,
    pub client_phone: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. Payloads e respostas da API
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueMagicLinkPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "client_phone is required"))]
    #[schema(example = "+15559990000")]
    pub client_phone: String,

    #[schema(example = "Maria Silva")]
    pub client_name: Option<String>,

    #[schema(example = "maria@cliente.com")]
    pub client_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedMagicLink {
    pub token: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssueMagicLinkResponse {
    pub success: bool,
    pub url: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PortalQuery {
    pub token: Option<String>,
}

/// Tudo o que o portal mostra para um cliente de um tenant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortalView {
    pub client_phone: String,
    pub client_name: String,
    pub messages: Vec<Message>,
    pub milestones: Vec<Milestone>,
    pub files: Vec<ClientFile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PortalResponse {
    pub success: bool,
    #[serde(flatten)]
    pub view: PortalView,
}
