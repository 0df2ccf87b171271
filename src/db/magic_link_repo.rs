// src/db/magic_link_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        portal::{MagicLink, NewMagicLink},
        tenancy::TenantScope,
    },
};

#[async_trait]
pub trait MagicLinkRepository: Send + Sync {
    async fn insert(&self, scope: &TenantScope, link: &NewMagicLink) -> Result<MagicLink, AppError>;

    // Não recebe escopo: o registro encontrado é quem define o tenant.
    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, AppError>;
}

#[derive(Clone)]
pub struct PgMagicLinkRepository {
    pool: PgPool,
}

impl PgMagicLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MagicLinkRepository for PgMagicLinkRepository {
    async fn insert(&self, scope: &TenantScope, link: &NewMagicLink) -> Result<MagicLink, AppError> {
        let record = sqlx::query_as::<_, MagicLink>(
            r#"
            INSERT INTO magic_links
                (token, tenant_id, client_phone, client_name, client_email, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING token, tenant_id, client_phone, client_name, client_email, expires_at, created_at
            "#,
        )
            .bind(&link.token)
            .bind(scope.tenant_id())
            .bind(&link.client_phone)
            .bind(&link.client_name)
            .bind(&link.client_email)
            .bind(link.expires_at)
            .bind(link.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, AppError> {
        let record = sqlx::query_as::<_, MagicLink>(
            r#"
            SELECT token, tenant_id, client_phone, client_name, client_email, expires_at, created_at
            FROM magic_links
            WHERE token = $1
            "#,
        )
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }
}
