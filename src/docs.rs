// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::verify,

        // --- Messages ---
        handlers::messaging::list_messages,
        handlers::messaging::send_message,
        handlers::messaging::verify_phone,

        // --- Settings ---
        handlers::settings::get_auto_reply_status,
        handlers::settings::set_auto_reply_status,
        handlers::settings::get_conversation_settings,
        handlers::settings::save_conversation_settings,

        // --- Portal ---
        handlers::portal::generate_link,
        handlers::portal::verify_link,

        // --- Webhooks ---
        handlers::webhooks::receive_message,
        handlers::webhooks::milestone_complete,
        handlers::webhooks::file_uploaded,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthMessageResponse,
            models::auth::SessionStatusResponse,

            // --- Messages ---
            models::messaging::Message,
            models::messaging::MessageSummary,
            models::messaging::SendMessagePayload,
            models::messaging::ConversationSettings,
            models::messaging::ConversationSettingsPayload,

            // --- Portal ---
            models::messaging::Milestone,
            models::messaging::ClientFile,
            models::portal::IssueMagicLinkPayload,
            models::portal::IssueMagicLinkResponse,
            models::portal::PortalView,
            models::portal::PortalResponse,

            // --- Webhooks ---
            models::messaging::InboundMessagePayload,
            models::messaging::MilestoneCompletePayload,
            models::messaging::FileUploadedPayload,

            // --- Tenancy ---
            models::tenancy::Tenant,
        )
    ),
    tags(
        (name = "Auth", description = "Sessão dos admins (cookie admin_token)"),
        (name = "Messages", description = "Mensagens e WhatsApp Cloud API"),
        (name = "Settings", description = "Resposta automática e configurações por conversa"),
        (name = "Portal", description = "Magic links e portal do cliente"),
        (name = "Webhooks", description = "Integrações servidor-a-servidor (n8n)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("admin_token"))),
        );
        components.add_security_scheme(
            "webhook_secret",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Webhook-Secret"))),
        );
    }
}
