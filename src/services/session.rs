// src/services/session.rs

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthContext, LEGACY_ROLE},
};

/// Validade fixa das sessões de admin.
pub const SESSION_TTL_DAYS: i64 = 7;

// ---
// Formatos de claims aceitos
// ---

// Formato atual: carrega o tenant explicitamente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub tenant_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

// Formato anterior ao multi-tenant: `{ authenticated: true, timestamp }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLegacyClaims")]
pub struct LegacyClaims {
    pub authenticated: bool,
    pub timestamp: Option<i64>,
    pub exp: i64,
}

// Um `tenantId` presente (mesmo inválido) desqualifica o formato legado.
#[derive(Deserialize)]
struct RawLegacyClaims {
    authenticated: bool,
    #[serde(default)]
    timestamp: Option<i64>,
    exp: i64,
    #[serde(default, rename = "tenantId")]
    tenant_id: Option<serde_json::Value>,
}

impl TryFrom<RawLegacyClaims> for LegacyClaims {
    type Error = &'static str;

    fn try_from(raw: RawLegacyClaims) -> Result<Self, Self::Error> {
        if raw.tenant_id.is_some() {
            return Err("token legado não pode carregar tenantId");
        }

        Ok(Self {
            authenticated: raw.authenticated,
            timestamp: raw.timestamp,
            exp: raw.exp,
        })
    }
}

/// Claims decodificadas. A variante é escolhida pelo parse, nunca por
/// inspeção de campos depois do fato: se `tenantId` está presente e é válido,
/// é `Current`; se está ausente, tenta-se `Legacy`; senão o token é rejeitado.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SessionClaims {
    Current(CurrentClaims),
    Legacy(LegacyClaims),
}

impl SessionClaims {
    /// Converte as claims num contexto autenticado.
    ///
    /// Tokens legados só valem se houver um tenant de fallback configurado,
    /// e recebem sempre o papel `agency_admin`, sem identidade de usuário.
    /// Sem fallback, falha fechado: nunca se inventa um tenant.
    pub fn into_auth_context(self, legacy_fallback_tenant: Option<Uuid>) -> Option<AuthContext> {
        match self {
            SessionClaims::Current(claims) => Some(AuthContext {
                user_id: claims.user_id,
                tenant_id: claims.tenant_id,
                tenant_slug: claims.tenant_slug,
                email: claims.email,
                role: claims.role,
            }),
            SessionClaims::Legacy(LegacyClaims { authenticated: true, .. }) => {
                legacy_fallback_tenant.map(|tenant_id| AuthContext {
                    user_id: None,
                    tenant_id,
                    tenant_slug: None,
                    email: None,
                    role: LEGACY_ROLE.to_string(),
                })
            }
            SessionClaims::Legacy(_) => None,
        }
    }
}

// ---
// Codec (JWT HS256)
// ---

#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Configuration("JWT_SECRET não configurado".into()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(SESSION_TTL_DAYS),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn encode(&self, ctx: &AuthContext) -> Result<String, AppError> {
        self.encode_at(ctx, Utc::now())
    }

    /// Assina um token no formato atual, emitido em `issued_at`.
    pub fn encode_at(&self, ctx: &AuthContext, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let expires_at = issued_at + self.ttl;

        let claims = CurrentClaims {
            user_id: ctx.user_id,
            tenant_id: ctx.tenant_id,
            tenant_slug: ctx.tenant_slug.clone(),
            email: ctx.email.clone(),
            role: ctx.role.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Qualquer falha (assinatura, expiração, payload malformado) vira `None`.
    /// O motivo fica só no log de debug.
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(reason = %e, "token de sessão rejeitado");
                None
            }
        }
    }
}
