// src/services/auth.rs

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bcrypt::verify;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::AuthContext,
    services::session::SessionCodec,
};

/// Nome fixo do cookie de sessão dos admins.
pub const SESSION_COOKIE_NAME: &str = "admin_token";

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    codec: SessionCodec,
    legacy_fallback_tenant: Option<Uuid>,
    cross_site_cookie: bool,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        codec: SessionCodec,
        legacy_fallback_tenant: Option<Uuid>,
        cross_site_cookie: bool,
    ) -> Self {
        Self { user_repo, codec, legacy_fallback_tenant, cross_site_cookie }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Verifica e-mail/senha e emite o token de sessão.
    /// E-mail desconhecido e senha errada são indistinguíveis para o cliente.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, AuthContext), AppError> {
        let user = self.user_repo
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let ctx = AuthContext {
            user_id: Some(user.id),
            tenant_id: user.tenant_id,
            tenant_slug: Some(user.tenant_slug),
            email: Some(user.email),
            role: user.role,
        };

        let token = self.codec.encode(&ctx)?;
        tracing::info!(tenant_id = %ctx.tenant_id, "🔑 Sessão emitida");

        Ok((token, ctx))
    }

    /// Recupera o contexto autenticado do cookie de sessão.
    ///
    /// Cookie ausente, token inválido/expirado, ou token legado sem tenant de
    /// fallback configurado: tudo resulta em `None`.
    pub fn auth_payload(&self, jar: &CookieJar) -> Option<AuthContext> {
        let token = jar.get(SESSION_COOKIE_NAME)?.value();
        if token.is_empty() {
            return None;
        }

        self.codec
            .decode(token)?
            .into_auth_context(self.legacy_fallback_tenant)
    }

    /// Porta de entrada das rotas de admin: sem contexto, `NotAuthenticated` (401).
    pub fn require_auth(&self, jar: &CookieJar) -> Result<AuthContext, AppError> {
        self.auth_payload(jar).ok_or(AppError::NotAuthenticated)
    }

    /// Cookie da sessão recém-emitida.
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        let max_age = time::Duration::seconds(self.codec.ttl().num_seconds());
        let mut cookie = build_cookie(token.to_owned(), self.cross_site_cookie);
        cookie.set_max_age(max_age);
        cookie
    }

    /// Cookie que apaga a sessão no navegador (logout).
    pub fn clear_session_cookie(&self) -> Cookie<'static> {
        let mut cookie = build_cookie(String::new(), self.cross_site_cookie);
        cookie.make_removal();
        cookie
    }
}

// Em produção o front e o backend ficam em origens diferentes, então o cookie
// precisa de `SameSite=None; Secure` para ser enviado cross-origin.
fn build_cookie(value: String, cross_site: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(if cross_site { SameSite::None } else { SameSite::Lax })
        .secure(cross_site)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

    use crate::models::auth::UserCredentials;

    struct NoUsers;

    #[async_trait]
    impl UserRepository for NoUsers {
        async fn find_active_by_email(&self, _email: &str) -> Result<Option<UserCredentials>, AppError> {
            Ok(None)
        }
    }

    fn service(fallback: Option<Uuid>, cross_site: bool) -> AuthService {
        AuthService::new(
            Arc::new(NoUsers),
            SessionCodec::new("segredo-de-teste").unwrap(),
            fallback,
            cross_site,
        )
    }

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn missing_cookie_is_no_session() {
        let svc = service(None, false);
        assert!(svc.auth_payload(&CookieJar::new()).is_none());
        assert!(matches!(svc.require_auth(&CookieJar::new()), Err(AppError::NotAuthenticated)));
    }

    #[test]
    fn reads_session_from_admin_token_cookie() {
        let svc = service(None, false);
        let ctx = AuthContext {
            user_id: Some(Uuid::new_v4()),
            tenant_id: Uuid::new_v4(),
            tenant_slug: Some("acme".into()),
            email: Some("admin@acme.com".into()),
            role: "agency_admin".into(),
        };
        let token = svc.codec().encode(&ctx).unwrap();

        let jar = jar_with(&format!("theme=dark; {SESSION_COOKIE_NAME}={token}"));
        assert_eq!(svc.require_auth(&jar).unwrap(), ctx);
    }

    #[test]
    fn other_cookies_do_not_count() {
        let svc = service(None, false);
        let jar = jar_with("session=abc; token=def");
        assert!(svc.auth_payload(&jar).is_none());
    }

    #[test]
    fn development_cookie_is_lax() {
        let cookie = service(None, false).session_cookie("abc");
        let parsed = Cookie::parse(cookie.to_string()).unwrap();

        assert_eq!(parsed.name(), SESSION_COOKIE_NAME);
        assert_eq!(parsed.value(), "abc");
        assert_eq!(parsed.path(), Some("/"));
        assert_eq!(parsed.http_only(), Some(true));
        assert_eq!(parsed.same_site(), Some(SameSite::Lax));
        assert_eq!(parsed.secure(), None);
        assert_eq!(parsed.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn production_cookie_is_cross_site() {
        let cookie = service(None, true).session_cookie("abc");
        let parsed = Cookie::parse(cookie.to_string()).unwrap();

        assert_eq!(parsed.same_site(), Some(SameSite::None));
        assert_eq!(parsed.secure(), Some(true));
        assert_eq!(parsed.http_only(), Some(true));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = service(None, true).clear_session_cookie();
        let parsed = Cookie::parse(cookie.to_string()).unwrap();

        assert_eq!(parsed.name(), SESSION_COOKIE_NAME);
        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.path(), Some("/"));
        assert_eq!(parsed.max_age(), Some(time::Duration::ZERO));
        // Mesmos atributos do cookie de login, senão o navegador não o substitui
        assert_eq!(parsed.same_site(), Some(SameSite::None));
        assert_eq!(parsed.secure(), Some(true));
    }

    #[tokio::test]
    async fn unknown_user_is_invalid_credentials() {
        let svc = service(None, false);
        let result = svc.login_user("ninguem@acme.com", "senha").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }
}
