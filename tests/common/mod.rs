// tests/common/mod.rs
//
// Repositórios em memória e um cliente WhatsApp que só grava o que recebeu.
// Cada arquivo de teste usa só parte disto.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use whatsapp_admin::{
    app::build_router,
    common::error::AppError,
    config::{AppState, Config, Repositories},
    db::{
        ClientFileRepository, MagicLinkRepository, MessageRepository, MilestoneRepository,
        SettingsRepository, TenantRepository, UserRepository,
    },
    models::{
        auth::{AuthContext, UserCredentials},
        messaging::{ClientFile, ConversationSettings, Message, Milestone, NewMessage},
        portal::{MagicLink, NewMagicLink},
        tenancy::{Tenant, TenantScope},
    },
    services::{session::SessionCodec, whatsapp::WhatsAppApi},
};

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const PORTAL_BASE_URL: &str = "https://portal.example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

// ---
// Repositórios em memória
// ---

#[derive(Default)]
pub struct MemoryStore {
    pub tenants: Mutex<Vec<Tenant>>,
    pub users: Mutex<Vec<UserCredentials>>,
    pub magic_links: Mutex<Vec<MagicLink>>,
    pub messages: Mutex<Vec<(Uuid, Message)>>,
    pub milestones: Mutex<Vec<(Uuid, String, Milestone)>>,
    pub files: Mutex<Vec<(Uuid, String, ClientFile)>>,
    pub auto_reply: Mutex<Vec<(Uuid, bool)>>,
    pub conversations: Mutex<Vec<(Uuid, ConversationSettings)>>,
}

impl MemoryStore {
    pub fn add_tenant(&self, slug: &str, whatsapp_number: &str) -> Tenant {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            slug: slug.into(),
            whatsapp_number: whatsapp_number.into(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.tenants.lock().unwrap().push(tenant.clone());
        tenant
    }

    pub fn add_admin(&self, tenant: &Tenant, email: &str) {
        // Custo mínimo do bcrypt para os testes não ficarem lentos
        let password_hash = bcrypt::hash(ADMIN_PASSWORD, 4).unwrap();
        self.users.lock().unwrap().push(UserCredentials {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash,
            role: "agency_admin".into(),
            tenant_id: tenant.id,
            tenant_slug: tenant.slug.clone(),
        });
    }

    pub fn add_message(&self, tenant: &Tenant, id: &str, from: &str, to: &str, text: &str, timestamp: i64) {
        self.messages.lock().unwrap().push((
            tenant.id,
            Message {
                id: id.into(),
                from_number: from.into(),
                to_number: to.into(),
                text: text.into(),
                timestamp,
                message_type: "text".into(),
                status: "received".into(),
                is_sent: false,
            },
        ));
    }

    pub fn add_milestone(&self, tenant: &Tenant, phone: &str, title: &str) {
        self.add_milestone_at(tenant, phone, title, "complete", Utc::now());
    }

    pub fn add_milestone_at(
        &self,
        tenant: &Tenant,
        phone: &str,
        title: &str,
        status: &str,
        created_at: DateTime<Utc>,
    ) {
        self.milestones.lock().unwrap().push((
            tenant.id,
            phone.into(),
            Milestone {
                id: Uuid::new_v4(),
                title: title.into(),
                status: status.into(),
                completed_at: (status == "complete").then_some(created_at),
                created_at,
            },
        ));
    }

    pub fn add_file(&self, tenant: &Tenant, phone: &str, file_name: &str) {
        self.add_file_at(tenant, phone, file_name, Utc::now());
    }

    pub fn add_file_at(&self, tenant: &Tenant, phone: &str, file_name: &str, uploaded_at: DateTime<Utc>) {
        self.files.lock().unwrap().push((
            tenant.id,
            phone.into(),
            ClientFile {
                id: Uuid::new_v4(),
                file_name: file_name.into(),
                file_url: format!("https://files.example.com/{file_name}"),
                uploaded_at,
            },
        ));
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn magic_link_count(&self) -> usize {
        self.magic_links.lock().unwrap().len()
    }
}

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn find_active_by_whatsapp_number(&self, whatsapp_number: &str) -> Result<Option<Tenant>, AppError> {
        Ok(self.tenants.lock().unwrap().iter()
            .find(|t| t.is_active && t.whatsapp_number == whatsapp_number)
            .cloned())
    }

    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        Ok(self.tenants.lock().unwrap().iter()
            .find(|t| t.is_active && t.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_active_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl MagicLinkRepository for MemoryStore {
    async fn insert(&self, scope: &TenantScope, link: &NewMagicLink) -> Result<MagicLink, AppError> {
        let record = MagicLink {
            token: link.token.clone(),
            tenant_id: scope.tenant_id(),
            client_phone: link.client_phone.clone(),
            client_name: link.client_name.clone(),
            client_email: link.client_email.clone(),
            expires_at: link.expires_at,
            created_at: link.created_at,
        };
        self.magic_links.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<MagicLink>, AppError> {
        Ok(self.magic_links.lock().unwrap().iter().find(|l| l.token == token).cloned())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn list_recent(&self, scope: &TenantScope, limit: i64) -> Result<Vec<Message>, AppError> {
        let mut messages: Vec<Message> = self.messages.lock().unwrap().iter()
            .filter(|(tenant_id, _)| *tenant_id == scope.tenant_id())
            .map(|(_, m)| m.clone())
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        messages.truncate(limit as usize);
        Ok(messages)
    }

    async fn list_for_client(&self, scope: &TenantScope, client_phone: &str) -> Result<Vec<Message>, AppError> {
        let mut messages: Vec<Message> = self.messages.lock().unwrap().iter()
            .filter(|(tenant_id, m)| {
                *tenant_id == scope.tenant_id()
                    && (m.from_number == client_phone || m.to_number == client_phone)
            })
            .map(|(_, m)| m.clone())
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn insert_if_absent(&self, scope: &TenantScope, message: &NewMessage) -> Result<bool, AppError> {
        let mut messages = self.messages.lock().unwrap();
        if messages.iter().any(|(_, m)| m.id == message.id) {
            return Ok(false);
        }
        messages.push((
            scope.tenant_id(),
            Message {
                id: message.id.clone(),
                from_number: message.from_number.clone(),
                to_number: message.to_number.clone(),
                text: message.text.clone(),
                timestamp: message.timestamp,
                message_type: message.message_type.clone(),
                status: message.status.clone(),
                is_sent: message.is_sent,
            },
        ));
        Ok(true)
    }
}

#[async_trait]
impl MilestoneRepository for MemoryStore {
    async fn list_for_client(&self, scope: &TenantScope, client_phone: &str) -> Result<Vec<Milestone>, AppError> {
        // Mesma ordem do SQL: created_at ASC
        let mut milestones: Vec<Milestone> = self.milestones.lock().unwrap().iter()
            .filter(|(tenant_id, phone, _)| *tenant_id == scope.tenant_id() && phone == client_phone)
            .map(|(_, _, m)| m.clone())
            .collect();
        milestones.sort_by_key(|m| m.created_at);
        Ok(milestones)
    }

    async fn insert_completed(
        &self,
        scope: &TenantScope,
        client_phone: &str,
        title: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError> {
        let mut milestones = self.milestones.lock().unwrap();
        let exists = milestones.iter().any(|(tenant_id, phone, m)| {
            *tenant_id == scope.tenant_id() && phone == client_phone && m.title == title
        });
        if exists {
            return Ok(None);
        }

        let id = Uuid::new_v4();
        milestones.push((
            scope.tenant_id(),
            client_phone.into(),
            Milestone {
                id,
                title: title.into(),
                status: "complete".into(),
                completed_at: Some(completed_at),
                created_at: completed_at,
            },
        ));
        Ok(Some(id))
    }
}

#[async_trait]
impl ClientFileRepository for MemoryStore {
    async fn list_for_client(&self, scope: &TenantScope, client_phone: &str) -> Result<Vec<ClientFile>, AppError> {
        // Mesma ordem do SQL: uploaded_at DESC
        let mut files: Vec<ClientFile> = self.files.lock().unwrap().iter()
            .filter(|(tenant_id, phone, _)| *tenant_id == scope.tenant_id() && phone == client_phone)
            .map(|(_, _, f)| f.clone())
            .collect();
        files.sort_by_key(|f| std::cmp::Reverse(f.uploaded_at));
        Ok(files)
    }

    async fn insert(
        &self,
        scope: &TenantScope,
        client_phone: &str,
        file_name: &str,
        file_url: &str,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.files.lock().unwrap().push((
            scope.tenant_id(),
            client_phone.into(),
            ClientFile {
                id,
                file_name: file_name.into(),
                file_url: file_url.into(),
                uploaded_at: Utc::now(),
            },
        ));
        Ok(id)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn auto_reply_enabled(&self, scope: &TenantScope) -> Result<bool, AppError> {
        Ok(self.auto_reply.lock().unwrap().iter()
            .find(|(tenant_id, _)| *tenant_id == scope.tenant_id())
            .is_some_and(|(_, enabled)| *enabled))
    }

    async fn set_auto_reply_enabled(&self, scope: &TenantScope, enabled: bool) -> Result<(), AppError> {
        let mut settings = self.auto_reply.lock().unwrap();
        settings.retain(|(tenant_id, _)| *tenant_id != scope.tenant_id());
        settings.push((scope.tenant_id(), enabled));
        Ok(())
    }

    async fn conversation_settings(
        &self,
        scope: &TenantScope,
        phone_number: &str,
    ) -> Result<Option<ConversationSettings>, AppError> {
        Ok(self.conversations.lock().unwrap().iter()
            .find(|(tenant_id, s)| *tenant_id == scope.tenant_id() && s.phone_number == phone_number)
            .map(|(_, s)| s.clone()))
    }

    async fn upsert_conversation_settings(
        &self,
        scope: &TenantScope,
        settings: &ConversationSettings,
    ) -> Result<ConversationSettings, AppError> {
        let mut conversations = self.conversations.lock().unwrap();
        conversations.retain(|(tenant_id, s)| {
            !(*tenant_id == scope.tenant_id() && s.phone_number == settings.phone_number)
        });
        let saved = ConversationSettings { updated_at: Some(Utc::now()), ..settings.clone() };
        conversations.push((scope.tenant_id(), saved.clone()));
        Ok(saved)
    }
}

// ---
// WhatsApp falso
// ---

#[derive(Default)]
pub struct RecordingWhatsApp {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingWhatsApp {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WhatsAppApi for RecordingWhatsApp {
    async fn send_text(&self, to: &str, body: &str) -> Result<Value, AppError> {
        if self.fail {
            return Err(AppError::WhatsApp("Recipient phone number not in allowed list".into()));
        }
        self.sent.lock().unwrap().push((to.into(), body.into()));
        Ok(json!({ "messages": [{ "id": "wamid.TEST123" }] }))
    }

    async fn phone_status(&self) -> Result<Value, AppError> {
        Ok(json!({ "verified_name": "Acme", "quality_rating": "GREEN" }))
    }
}

// ---
// Aplicação de teste
// ---

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub whatsapp: Arc<RecordingWhatsApp>,
    pub codec: SessionCodec,
}

pub struct TestAppBuilder {
    env: Vec<(&'static str, String)>,
    whatsapp: RecordingWhatsApp,
    store: MemoryStore,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            env: vec![
                ("DATABASE_URL", "postgres://unused/test".into()),
                ("JWT_SECRET", JWT_SECRET.into()),
                ("WEBHOOK_SECRET", WEBHOOK_SECRET.into()),
                ("PORTAL_BASE_URL", PORTAL_BASE_URL.into()),
            ],
            whatsapp: RecordingWhatsApp::default(),
            store: MemoryStore::default(),
        }
    }

    pub fn env(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.into()));
        self
    }

    pub fn without_env(mut self, key: &'static str) -> Self {
        self.env.retain(|(k, _)| *k != key);
        self
    }

    pub fn whatsapp(mut self, whatsapp: RecordingWhatsApp) -> Self {
        self.whatsapp = whatsapp;
        self
    }

    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> TestApp {
        let env = self.env;
        let config = Config::from_lookup(|key| {
            env.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
        })
        .unwrap();

        let store = Arc::new(self.store);
        let whatsapp = Arc::new(self.whatsapp);

        let repos = Repositories {
            tenants: store.clone(),
            users: store.clone(),
            magic_links: store.clone(),
            messages: store.clone(),
            milestones: store.clone(),
            files: store.clone(),
            settings: store.clone(),
        };

        let codec = SessionCodec::new(JWT_SECRET).unwrap();
        let state = AppState::new(config, repos, whatsapp.clone()).unwrap();

        TestApp { router: build_router(state), store, whatsapp, codec }
    }
}

impl TestApp {
    pub fn session_for(&self, tenant: &Tenant) -> String {
        let ctx = AuthContext {
            user_id: Some(Uuid::new_v4()),
            tenant_id: tenant.id,
            tenant_slug: Some(tenant.slug.clone()),
            email: Some(format!("admin@{}.com", tenant.slug)),
            role: "agency_admin".into(),
        };
        self.codec.encode(&ctx).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

// ---
// Requisições
// ---

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_session(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("admin_token={token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_with_session(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("admin_token={token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn webhook(uri: &str, secret: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(secret) = secret {
        builder = builder.header("X-Webhook-Secret", secret);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
