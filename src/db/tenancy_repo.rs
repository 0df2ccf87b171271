// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AppError, models::tenancy::Tenant};

/// Leitura de tenants para caminhos sem sessão (webhooks).
/// Só tenants ativos são retornados.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_active_by_whatsapp_number(
        &self,
        whatsapp_number: &str,
    ) -> Result<Option<Tenant>, AppError>;

    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError>;
}

#[derive(Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_active_by_whatsapp_number(
        &self,
        whatsapp_number: &str,
    ) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, slug, whatsapp_number, is_active, created_at
            FROM tenants
            WHERE whatsapp_number = $1 AND is_active = TRUE
            "#,
        )
            .bind(whatsapp_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }

    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, slug, whatsapp_number, is_active, created_at
            FROM tenants
            WHERE slug = $1 AND is_active = TRUE
            "#,
        )
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }
}
