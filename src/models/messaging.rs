// src/models/messaging.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_AUTO_REPLY_MESSAGE: &str =
    "Thank you for your message! We'll get back to you soon.";

// --- MENSAGENS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: String,
    pub from_number: String,
    pub to_number: String,
    pub text: String,
    // Unix timestamp (segundos), como chega da WhatsApp
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub message_type: String,
    pub status: String,
    pub is_sent: bool,
}

// Formato esperado pelo dashboard na listagem
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageSummary {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub message_type: String,
    pub status: String,
}

impl From<Message> for MessageSummary {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            from: msg.from_number,
            to: msg.to_number,
            text: msg.text,
            timestamp: msg.timestamp,
            message_type: msg.message_type,
            status: msg.status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: String,
    pub from_number: String,
    pub to_number: String,
    pub text: String,
    pub timestamp: i64,
    pub message_type: String,
    pub status: String,
    pub is_sent: bool,
}

// --- MARCOS E ARQUIVOS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClientFile {
    pub id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

// --- CONFIGURAÇÕES POR CONVERSA ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ConversationSettings {
    pub phone_number: String,
    pub auto_reply_enabled: bool,
    pub auto_reply_message: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConversationSettings {
    pub fn default_for(phone_number: &str) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            auto_reply_enabled: false,
            auto_reply_message: DEFAULT_AUTO_REPLY_MESSAGE.to_string(),
            updated_at: None,
        }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessagePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields: to and message"))]
    #[schema(example = "+15559990000")]
    pub to: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields: to and message"))]
    #[schema(example = "Olá! Seu pedido está pronto.")]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConversationSettingsPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "phone_number is required"))]
    pub phone_number: String,
    pub auto_reply_enabled: Option<bool>,
    pub auto_reply_message: Option<String>,
}

// Mensagem recebida, repassada pelo n8n
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InboundMessagePayload {
    pub message_id: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "from and text are required"))]
    pub from: String,

    // Número de negócio que recebeu a mensagem (resolve o tenant)
    #[serde(default)]
    pub to: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "from and text are required"))]
    pub text: String,

    pub timestamp: Option<i64>,

    #[serde(rename = "type")]
    pub message_type: Option<String>,

    #[serde(default)]
    pub is_sent: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MilestoneCompletePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "client_phone and milestone_title are required"))]
    pub client_phone: String,

    pub client_name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "client_phone and milestone_title are required"))]
    pub milestone_title: String,

    #[serde(default)]
    pub notify_whatsapp: bool,

    pub tenant_slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FileUploadedPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "client_phone, file_name, and file_url are required"))]
    pub client_phone: String,

    pub client_name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "client_phone, file_name, and file_url are required"))]
    pub file_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "client_phone, file_name, and file_url are required"))]
    pub file_url: String,

    #[serde(default)]
    pub notify_whatsapp: bool,

    pub tenant_slug: Option<String>,
}
