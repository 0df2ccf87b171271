// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ClientFileRepository, MagicLinkRepository, MessageRepository, MilestoneRepository,
        PgClientFileRepository, PgMagicLinkRepository, PgMessageRepository, PgMilestoneRepository,
        PgSettingsRepository, PgTenantRepository, PgUserRepository, SettingsRepository,
        TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService, portal::PortalService, session::SessionCodec,
        tenancy_service::TenantService, whatsapp::WhatsAppApi,
    },
};

const DEFAULT_LEGACY_TENANT_SLUG: &str = "fellocoder";
const DEFAULT_WHATSAPP_API_VERSION: &str = "v18.0";
const DEFAULT_WHATSAPP_API_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub access_token: Option<SecretString>,
    pub phone_number_id: Option<String>,
    pub api_version: String,
    pub base_url: String,
}

/// Configuração do processo, lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: SecretString,
    pub jwt_secret: SecretString,
    // Tenant usado pelos tokens anteriores ao multi-tenant
    pub legacy_fallback_tenant_id: Option<Uuid>,
    pub legacy_tenant_slug: String,
    pub portal_base_url: Option<String>,
    pub webhook_secret: Option<SecretString>,
    pub whatsapp: WhatsAppConfig,
    pub production: bool,
    pub cors_allow_origins: Vec<String>,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave → valor.
    /// Valores vazios contam como ausentes.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let legacy_fallback_tenant_id = get("LEGACY_FALLBACK_TENANT_ID")
            .map(|raw| Uuid::parse_str(&raw))
            .transpose()
            .context("LEGACY_FALLBACK_TENANT_ID precisa ser um UUID")?;

        let port = get("PORT")
            .map(|raw| raw.parse::<u16>())
            .transpose()
            .context("PORT inválida")?
            .unwrap_or(DEFAULT_PORT);

        let db_max_connections = get("DATABASE_MAX_CONNECTIONS")
            .map(|raw| raw.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS inválido")?
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

        let db_acquire_timeout_secs = get("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("DATABASE_ACQUIRE_TIMEOUT_SECS inválido")?
            .unwrap_or(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS);

        let cors_allow_origins = get("CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: SecretString::from(database_url),
            jwt_secret: SecretString::from(jwt_secret),
            legacy_fallback_tenant_id,
            legacy_tenant_slug: get("LEGACY_TENANT_SLUG")
                .unwrap_or_else(|| DEFAULT_LEGACY_TENANT_SLUG.to_string()),
            portal_base_url: get("PORTAL_BASE_URL"),
            webhook_secret: get("WEBHOOK_SECRET").map(SecretString::from),
            whatsapp: WhatsAppConfig {
                access_token: get("WHATSAPP_ACCESS_TOKEN").map(SecretString::from),
                phone_number_id: get("WHATSAPP_PHONE_ID"),
                api_version: get("WHATSAPP_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_WHATSAPP_API_VERSION.to_string()),
                base_url: get("WHATSAPP_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_WHATSAPP_API_BASE_URL.to_string()),
            },
            production: get("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
            cors_allow_origins,
            port,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(db_acquire_timeout_secs),
        })
    }
}

/// Cria o pool de conexões. É criado uma vez no `main` e passado adiante.
pub async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .idle_timeout(Duration::from_secs(30))
        .connect(config.database_url.expose_secret())
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

/// Repositórios usados pela aplicação. Em produção, todos Postgres;
/// nos testes, implementações em memória.
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub users: Arc<dyn UserRepository>,
    pub magic_links: Arc<dyn MagicLinkRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub milestones: Arc<dyn MilestoneRepository>,
    pub files: Arc<dyn ClientFileRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tenants: Arc::new(PgTenantRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            magic_links: Arc::new(PgMagicLinkRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool.clone())),
            milestones: Arc::new(PgMilestoneRepository::new(pool.clone())),
            files: Arc::new(PgClientFileRepository::new(pool.clone())),
            settings: Arc::new(PgSettingsRepository::new(pool)),
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub portal_service: PortalService,
    pub tenant_service: TenantService,
    pub message_repo: Arc<dyn MessageRepository>,
    pub milestone_repo: Arc<dyn MilestoneRepository>,
    pub file_repo: Arc<dyn ClientFileRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub whatsapp: Arc<dyn WhatsAppApi>,
}

impl AppState {
    pub fn new(
        config: Config,
        repos: Repositories,
        whatsapp: Arc<dyn WhatsAppApi>,
    ) -> Result<Self, AppError> {
        // --- Monta o gráfico de dependências ---
        let codec = SessionCodec::new(config.jwt_secret.expose_secret())?;

        let auth_service = AuthService::new(
            repos.users.clone(),
            codec,
            config.legacy_fallback_tenant_id,
            config.production,
        );

        let portal_service = PortalService::new(
            repos.magic_links.clone(),
            repos.messages.clone(),
            repos.milestones.clone(),
            repos.files.clone(),
        );

        let tenant_service = TenantService::new(repos.tenants.clone(), config.legacy_tenant_slug.clone());

        if config.webhook_secret.is_none() {
            tracing::warn!("⚠️ WEBHOOK_SECRET não definido: webhooks aceitos sem autenticação");
        }
        if config.legacy_fallback_tenant_id.is_some() {
            tracing::info!("Tokens de sessão legados aceitos com tenant de fallback");
        }

        Ok(Self {
            config: Arc::new(config),
            auth_service,
            portal_service,
            tenant_service,
            message_repo: repos.messages,
            milestone_repo: repos.milestones,
            file_repo: repos.files,
            settings_repo: repos.settings,
            whatsapp,
        })
    }
}
