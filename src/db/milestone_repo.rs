// src/db/milestone_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{messaging::Milestone, tenancy::TenantScope},
};

#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    async fn list_for_client(
        &self,
        scope: &TenantScope,
        client_phone: &str,
    ) -> Result<Vec<Milestone>, AppError>;

    /// Registra um marco concluído. `None` se o mesmo marco já existia.
    async fn insert_completed(
        &self,
        scope: &TenantScope,
        client_phone: &str,
        title: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError>;
}

#[derive(Clone)]
pub struct PgMilestoneRepository {
    pool: PgPool,
}

impl PgMilestoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneRepository for PgMilestoneRepository {
    async fn list_for_client(
        &self,
        scope: &TenantScope,
        client_phone: &str,
    ) -> Result<Vec<Milestone>, AppError> {
        let milestones = sqlx::query_as::<_, Milestone>(
            r#"
            SELECT id, title, status, completed_at, created_at
            FROM milestones
            WHERE client_phone = $1 AND tenant_id = $2
            ORDER BY created_at ASC
            "#,
        )
            .bind(client_phone)
            .bind(scope.tenant_id())
            .fetch_all(&self.pool)
            .await?;

        Ok(milestones)
    }

    async fn insert_completed(
        &self,
        scope: &TenantScope,
        client_phone: &str,
        title: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO milestones (tenant_id, client_phone, title, status, completed_at)
            VALUES ($1, $2, $3, 'complete', $4)
            ON CONFLICT DO NOTHING
            RETURNING id
            "#,
        )
            .bind(scope.tenant_id())
            .bind(client_phone)
            .bind(title)
            .bind(completed_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }
}
