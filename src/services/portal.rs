// src/services/portal.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::{
    common::error::AppError,
    db::{ClientFileRepository, MagicLinkRepository, MessageRepository, MilestoneRepository},
    models::{
        portal::{IssuedMagicLink, NewMagicLink, PortalView},
        tenancy::TenantScope,
    },
};

/// Validade fixa dos magic links.
pub const MAGIC_LINK_TTL_DAYS: i64 = 7;

// 32 bytes = 256 bits de entropia (64 caracteres hex)
const MAGIC_TOKEN_BYTES: usize = 32;

/// Dados do cliente para quem o link é emitido.
#[derive(Debug, Clone, Default)]
pub struct MagicLinkRequest {
    pub client_phone: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
}

#[derive(Clone)]
pub struct PortalService {
    links: Arc<dyn MagicLinkRepository>,
    messages: Arc<dyn MessageRepository>,
    milestones: Arc<dyn MilestoneRepository>,
    files: Arc<dyn ClientFileRepository>,
}

impl PortalService {
    pub fn new(
        links: Arc<dyn MagicLinkRepository>,
        messages: Arc<dyn MessageRepository>,
        milestones: Arc<dyn MilestoneRepository>,
        files: Arc<dyn ClientFileRepository>,
    ) -> Self {
        Self { links, messages, milestones, files }
    }

    pub async fn issue_magic_link(
        &self,
        scope: &TenantScope,
        request: MagicLinkRequest,
        base_url: &str,
    ) -> Result<IssuedMagicLink, AppError> {
        self.issue_magic_link_at(scope, request, base_url, Utc::now()).await
    }

    /// Emite um novo link para `(tenant, client_phone)`.
    ///
    /// Cada chamada gera um token novo e independente; links anteriores do
    /// mesmo cliente continuam válidos até expirarem.
    pub async fn issue_magic_link_at(
        &self,
        scope: &TenantScope,
        request: MagicLinkRequest,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedMagicLink, AppError> {
        let client_phone = request.client_phone.trim();
        if client_phone.is_empty() {
            return Err(AppError::BadRequest("client_phone is required".into()));
        }

        let new_link = NewMagicLink {
            token: generate_magic_token(),
            client_phone: client_phone.to_string(),
            client_name: request.client_name.unwrap_or_default(),
            client_email: request.client_email.filter(|e| !e.trim().is_empty()),
            expires_at: now + Duration::days(MAGIC_LINK_TTL_DAYS),
            created_at: now,
        };

        let record = self.links.insert(scope, &new_link).await?;
        let url = portal_url(base_url, &record.token);

        tracing::info!(
            tenant_id = %scope.tenant_id(),
            client_phone = %record.client_phone,
            expires_at = %record.expires_at,
            "🔗 Magic link emitido"
        );

        Ok(IssuedMagicLink {
            token: record.token,
            url,
            expires_at: record.expires_at,
        })
    }

    pub async fn resolve_portal(&self, token: &str) -> Result<PortalView, AppError> {
        self.resolve_portal_at(token, Utc::now()).await
    }

    /// Valida o token e agrega os dados do cliente, filtrados pelo tenant do link.
    ///
    /// Não consome o link: recarregar a página resolve de novo.
    pub async fn resolve_portal_at(&self, token: &str, now: DateTime<Utc>) -> Result<PortalView, AppError> {
        let link = self.links
            .find_by_token(token)
            .await?
            .ok_or(AppError::MagicLinkNotFound)?;

        if link.is_expired_at(now) {
            return Err(AppError::MagicLinkExpired);
        }

        let scope = TenantScope::from(&link);
        let phone = link.client_phone.as_str();

        // As três leituras são independentes; qualquer falha derruba a resolução.
        let (messages, milestones, files) = tokio::try_join!(
            self.messages.list_for_client(&scope, phone),
            self.milestones.list_for_client(&scope, phone),
            self.files.list_for_client(&scope, phone),
        )?;

        Ok(PortalView {
            client_phone: link.client_phone.clone(),
            client_name: link.client_name.clone(),
            messages,
            milestones,
            files,
        })
    }
}

/// Token opaco e imprevisível: é a única credencial do portal.
pub fn generate_magic_token() -> String {
    let mut bytes = [0u8; MAGIC_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn portal_url(base_url: &str, token: &str) -> String {
    format!("{}/portal/{}", base_url.trim_end_matches('/'), token)
}
