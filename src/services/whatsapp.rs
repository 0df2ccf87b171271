// src/services/whatsapp.rs

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use crate::{common::error::AppError, config::WhatsAppConfig};

// Campos consultados pelo GET /api/verify-phone
const PHONE_STATUS_FIELDS: &str = "verified_name,code_verification_status,quality_rating";

/// O que o backend precisa da WhatsApp Cloud API.
#[async_trait]
pub trait WhatsAppApi: Send + Sync {
    /// Envia uma mensagem de texto e devolve a resposta crua da API.
    async fn send_text(&self, to: &str, body: &str) -> Result<Value, AppError>;

    /// Status do número de negócio configurado.
    async fn phone_status(&self) -> Result<Value, AppError>;
}

// Corpo do POST /{phone_id}/messages
#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    preview_url: bool,
    body: &'a str,
}

impl<'a> SendTextRequest<'a> {
    fn new(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            message_type: "text",
            text: TextBody { preview_url: false, body },
        }
    }
}

struct Credentials {
    access_token: SecretString,
    phone_number_id: String,
}

/// Cliente HTTP da Cloud API (graph.facebook.com).
pub struct CloudApiClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
    base_url: String,
    api_version: String,
}

impl CloudApiClient {
    pub fn new(config: &WhatsAppConfig) -> Self {
        let credentials = match (&config.access_token, &config.phone_number_id) {
            (Some(token), Some(phone_id)) => Some(Credentials {
                access_token: token.clone(),
                phone_number_id: phone_id.clone(),
            }),
            _ => None,
        };

        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        }
    }

    fn credentials(&self) -> Result<&Credentials, AppError> {
        self.credentials.as_ref().ok_or_else(|| {
            AppError::Configuration(
                "WHATSAPP_ACCESS_TOKEN e WHATSAPP_PHONE_ID precisam estar definidos".into(),
            )
        })
    }

    fn phone_url(&self, phone_number_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, phone_number_id)
    }
}

#[async_trait]
impl WhatsAppApi for CloudApiClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<Value, AppError> {
        let creds = self.credentials()?;
        let url = format!("{}/messages", self.phone_url(&creds.phone_number_id));

        let response = self.http
            .post(&url)
            .bearer_auth(creds.access_token.expose_secret())
            .json(&SendTextRequest::new(to, body))
            .send()
            .await
            .map_err(|e| AppError::WhatsApp(e.to_string()))?;

        read_api_response(response, "Failed to send message").await
    }

    async fn phone_status(&self) -> Result<Value, AppError> {
        let creds = self.credentials()?;
        let url = self.phone_url(&creds.phone_number_id);

        let response = self.http
            .get(&url)
            .query(&[("fields", PHONE_STATUS_FIELDS)])
            .bearer_auth(creds.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::WhatsApp(e.to_string()))?;

        read_api_response(response, "Failed to verify phone").await
    }
}

async fn read_api_response(response: reqwest::Response, fallback: &str) -> Result<Value, AppError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::WhatsApp(e.to_string()))?;

    parse_api_body(status, &text, fallback)
}

// Erros da Graph API vêm como `{ "error": { "message": ... } }`.
// Resposta 2xx com corpo que não é JSON também é erro.
fn parse_api_body(status: reqwest::StatusCode, text: &str, fallback: &str) -> Result<Value, AppError> {
    if !status.is_success() {
        let body: Value = serde_json::from_str(text).unwrap_or(Value::Null);
        let message = upstream_error_message(&body).unwrap_or(fallback).to_string();
        tracing::warn!(%status, "WhatsApp API error: {}", message);
        return Err(AppError::WhatsApp(message));
    }

    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(%status, error = %e, "WhatsApp API devolveu corpo não-JSON");
        AppError::WhatsApp(format!("Invalid JSON from WhatsApp API: {e}"))
    })
}

fn upstream_error_message(body: &Value) -> Option<&str> {
    body.get("error")?.get("message")?.as_str()
}

/// Notificação opcional dos webhooks: falhas só geram log, nunca erro.
pub async fn notify_best_effort(api: &dyn WhatsAppApi, to: &str, body: &str) {
    match api.send_text(to, body).await {
        Ok(_) => tracing::info!(to, "📨 Notificação WhatsApp enviada"),
        Err(e) => tracing::warn!(to, error = %e, "Falha ao notificar via WhatsApp (ignorada)"),
    }
}
