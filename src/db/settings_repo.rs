// src/db/settings_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{messaging::ConversationSettings, tenancy::TenantScope},
};

const AUTO_REPLY_KEY: &str = "auto_reply_enabled";

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Chave global de resposta automática do tenant (padrão: desligada).
    async fn auto_reply_enabled(&self, scope: &TenantScope) -> Result<bool, AppError>;

    async fn set_auto_reply_enabled(&self, scope: &TenantScope, enabled: bool) -> Result<(), AppError>;

    async fn conversation_settings(
        &self,
        scope: &TenantScope,
        phone_number: &str,
    ) -> Result<Option<ConversationSettings>, AppError>;

    async fn upsert_conversation_settings(
        &self,
        scope: &TenantScope,
        settings: &ConversationSettings,
    ) -> Result<ConversationSettings, AppError>;
}

#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn auto_reply_enabled(&self, scope: &TenantScope) -> Result<bool, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM settings WHERE tenant_id = $1 AND key = $2",
        )
            .bind(scope.tenant_id())
            .bind(AUTO_REPLY_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.as_deref() == Some("true"))
    }

    async fn set_auto_reply_enabled(&self, scope: &TenantScope, enabled: bool) -> Result<(), AppError> {
        // UPSERT (Insert or Update)
        sqlx::query(
            r#"
            INSERT INTO settings (tenant_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (tenant_id, key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
            .bind(scope.tenant_id())
            .bind(AUTO_REPLY_KEY)
            .bind(if enabled { "true" } else { "false" })
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn conversation_settings(
        &self,
        scope: &TenantScope,
        phone_number: &str,
    ) -> Result<Option<ConversationSettings>, AppError> {
        let settings = sqlx::query_as::<_, ConversationSettings>(
            r#"
            SELECT phone_number, auto_reply_enabled, auto_reply_message, updated_at
            FROM conversations
            WHERE tenant_id = $1 AND phone_number = $2
            "#,
        )
            .bind(scope.tenant_id())
            .bind(phone_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(settings)
    }

    async fn upsert_conversation_settings(
        &self,
        scope: &TenantScope,
        settings: &ConversationSettings,
    ) -> Result<ConversationSettings, AppError> {
        let saved = sqlx::query_as::<_, ConversationSettings>(
            r#"
            INSERT INTO conversations (tenant_id, phone_number, auto_reply_enabled, auto_reply_message)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id, phone_number)
            DO UPDATE SET
                auto_reply_enabled = EXCLUDED.auto_reply_enabled,
                auto_reply_message = EXCLUDED.auto_reply_message,
                updated_at = NOW()
            RETURNING phone_number, auto_reply_enabled, auto_reply_message, updated_at
            "#,
        )
            .bind(scope.tenant_id())
            .bind(&settings.phone_number)
            .bind(settings.auto_reply_enabled)
            .bind(&settings.auto_reply_message)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }
}
