// src/services/tenancy_service.rs

use std::sync::Arc;

use crate::{common::error::AppError, db::TenantRepository, models::tenancy::Tenant};

/// Resolve tenants nos caminhos sem sessão (webhooks do n8n e do portal externo).
#[derive(Clone)]
pub struct TenantService {
    tenant_repo: Arc<dyn TenantRepository>,
    legacy_slug: String,
}

impl TenantService {
    pub fn new(tenant_repo: Arc<dyn TenantRepository>, legacy_slug: String) -> Self {
        Self { tenant_repo, legacy_slug }
    }

    /// Tenant ativo dono do número de negócio que recebeu a mensagem.
    pub async fn resolve_by_whatsapp_number(&self, whatsapp_number: &str) -> Result<Option<Tenant>, AppError> {
        let number = whatsapp_number.trim();
        if number.is_empty() {
            return Ok(None);
        }

        self.tenant_repo.find_active_by_whatsapp_number(number).await
    }

    /// Tenant ativo pelo slug. Sem slug, usa o slug legado (integrações da
    /// época de tenant único).
    pub async fn resolve_by_slug(&self, slug: Option<&str>) -> Result<Option<Tenant>, AppError> {
        let slug = slug
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.legacy_slug.as_str());

        self.tenant_repo.find_active_by_slug(slug).await
    }
}
