// src/db/message_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        messaging::{Message, NewMessage},
        tenancy::TenantScope,
    },
};

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Mensagens mais recentes do tenant (ordem decrescente de timestamp).
    async fn list_recent(&self, scope: &TenantScope, limit: i64) -> Result<Vec<Message>, AppError>;

    /// Conversa com um cliente, nos dois sentidos, da mais antiga para a mais nova.
    async fn list_for_client(
        &self,
        scope: &TenantScope,
        client_phone: &str,
    ) -> Result<Vec<Message>, AppError>;

    /// Retorna `false` quando o id já existia (reentrega do n8n).
    async fn insert_if_absent(&self, scope: &TenantScope, message: &NewMessage) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn list_recent(&self, scope: &TenantScope, limit: i64) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, from_number, to_number, message_text AS text, timestamp,
                   message_type, status, is_sent
            FROM messages
            WHERE tenant_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
            .bind(scope.tenant_id())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn list_for_client(
        &self,
        scope: &TenantScope,
        client_phone: &str,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, from_number, to_number, message_text AS text, timestamp,
                   message_type, status, is_sent
            FROM messages
            WHERE (from_number = $1 OR to_number = $1) AND tenant_id = $2
            ORDER BY timestamp ASC
            "#,
        )
            .bind(client_phone)
            .bind(scope.tenant_id())
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn insert_if_absent(&self, scope: &TenantScope, message: &NewMessage) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages
                (id, tenant_id, from_number, to_number, message_text, timestamp, message_type, status, is_sent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
            .bind(&message.id)
            .bind(scope.tenant_id())
            .bind(&message.from_number)
            .bind(&message.to_number)
            .bind(&message.text)
            .bind(message.timestamp)
            .bind(&message.message_type)
            .bind(&message.status)
            .bind(message.is_sent)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
