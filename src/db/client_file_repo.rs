// src/db/client_file_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{messaging::ClientFile, tenancy::TenantScope},
};

#[async_trait]
pub trait ClientFileRepository: Send + Sync {
    /// Arquivos do cliente, do mais novo para o mais antigo.
    async fn list_for_client(
        &self,
        scope: &TenantScope,
        client_phone: &str,
    ) -> Result<Vec<ClientFile>, AppError>;

    async fn insert(
        &self,
        scope: &TenantScope,
        client_phone: &str,
        file_name: &str,
        file_url: &str,
    ) -> Result<Uuid, AppError>;
}

#[derive(Clone)]
pub struct PgClientFileRepository {
    pool: PgPool,
}

impl PgClientFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientFileRepository for PgClientFileRepository {
    async fn list_for_client(
        &self,
        scope: &TenantScope,
        client_phone: &str,
    ) -> Result<Vec<ClientFile>, AppError> {
        let files = sqlx::query_as::<_, ClientFile>(
            r#"
            SELECT id, file_name, file_url, uploaded_at
            FROM client_files
            WHERE client_phone = $1 AND tenant_id = $2
            ORDER BY uploaded_at DESC
            "#,
        )
            .bind(client_phone)
            .bind(scope.tenant_id())
            .fetch_all(&self.pool)
            .await?;

        Ok(files)
    }

    async fn insert(
        &self,
        scope: &TenantScope,
        client_phone: &str,
        file_name: &str,
        file_url: &str,
    ) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO client_files (tenant_id, client_phone, file_name, file_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
            .bind(scope.tenant_id())
            .bind(client_phone)
            .bind(file_name)
            .bind(file_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }
}
