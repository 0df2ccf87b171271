// src/models/tenancy.rs

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::models::{auth::AuthContext, portal::MagicLink};

// ---
// 1. Tenant (A "Organização cliente")
// ---
// Criado fora desta aplicação (provisionamento); aqui só é lido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub slug: String,
    pub whatsapp_number: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. TenantScope (A "Chave" de particionamento)
// ---
/// Prova de que um tenant foi resolvido por um caminho confiável.
///
/// Só existe a partir de uma sessão autenticada, de um magic link válido ou
/// de um tenant ativo resolvido no caminho dos webhooks. Todo repositório
/// particionado exige um `&TenantScope`, então esquecer o filtro por tenant
/// vira erro de compilação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantScope(Uuid);

impl TenantScope {
    pub fn tenant_id(&self) -> Uuid {
        self.0
    }
}

impl From<&AuthContext> for TenantScope {
    fn from(ctx: &AuthContext) -> Self {
        Self(ctx.tenant_id)
    }
}

impl From<&MagicLink> for TenantScope {
    fn from(link: &MagicLink) -> Self {
        Self(link.tenant_id)
    }
}

impl From<&Tenant> for TenantScope {
    fn from(tenant: &Tenant) -> Self {
        Self(tenant.id)
    }
}
