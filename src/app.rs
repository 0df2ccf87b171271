// src/app.rs

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, webhook::{webhook_guard, WEBHOOK_SECRET_HEADER}},
};

/// Monta o router completo. Usado pelo `main` e pelos testes de integração.
pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/verify", get(handlers::auth::verify));

    // generate-link exige sessão; verify-link é o acesso do cliente
    let portal_routes = Router::new()
        .route("/generate-link", post(handlers::portal::generate_link))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/verify-link", get(handlers::portal::verify_link));

    // Dashboard dos admins (protegido pelo middleware)
    let admin_routes = Router::new()
        .route("/api/messages", get(handlers::messaging::list_messages))
        .route("/api/send-message", post(handlers::messaging::send_message))
        .route("/api/verify-phone", get(handlers::messaging::verify_phone))
        .route(
            "/api/auto-reply-status",
            get(handlers::settings::get_auto_reply_status)
                .post(handlers::settings::set_auto_reply_status),
        )
        .route(
            "/api/conversations/settings",
            get(handlers::settings::get_conversation_settings)
                .post(handlers::settings::save_conversation_settings)
                .put(handlers::settings::save_conversation_settings),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let webhook_routes = Router::new()
        .route("/milestone-complete", post(handlers::webhooks::milestone_complete))
        .route("/file-uploaded", post(handlers::webhooks::file_uploaded))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            webhook_guard,
        ));

    let n8n_routes = Router::new()
        .route("/receive", post(handlers::webhooks::receive_message))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            webhook_guard,
        ));

    let cors = cors_layer(&app_state.config.cors_allow_origins);

    // Combina tudo no router principal
    Router::new()
        .route("/healthz", get(|| async { Json(json!({ "status": "ok" })) }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api/portal", portal_routes)
        .nest("/api/webhooks", webhook_routes)
        .nest("/api/n8n", n8n_routes)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

// Cookies de sessão exigem credenciais no CORS, então a origem nunca é "*".
// Sem lista configurada, a origem da requisição é espelhada.
fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let origin = if allow_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = allow_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Origem CORS inválida ignorada");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(WEBHOOK_SECRET_HEADER),
        ])
}
