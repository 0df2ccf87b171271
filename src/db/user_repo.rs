// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AppError, models::auth::UserCredentials};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Usuário ativo de um tenant ativo, com o hash da senha (só para o login).
    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError>;
}

// O repositório de usuários, responsável pelas leituras na tabela 'users'
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.role,
                   u.tenant_id, t.slug AS tenant_slug
            FROM users u
            JOIN tenants t ON t.id = u.tenant_id
            WHERE u.email = $1 AND u.is_active = TRUE AND t.is_active = TRUE
            "#,
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
