//! Application wiring: state construction and the full router.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use workaccess_auth::{AccessPolicy, TokenCodec};
use workaccess_store::{
    AuditRepo, CompanyRepo, EmployeeRepo, FsEntityStore, OutboxRepo, UserRepo,
};

use crate::config::AppConfig;
use crate::limiter::LoginLimiter;
use crate::{error, middleware, routes};

/// Shared per-process state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub policy: AccessPolicy,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<FsEntityStore>,
    pub company: CompanyRepo<Arc<FsEntityStore>>,
    pub users: UserRepo<Arc<FsEntityStore>>,
    pub employees: EmployeeRepo<Arc<FsEntityStore>>,
    pub audit: AuditRepo<Arc<FsEntityStore>>,
    pub outbox: OutboxRepo<Arc<FsEntityStore>>,
    pub limiter: Arc<LoginLimiter>,
}

pub fn build_state(config: &AppConfig) -> AppState {
    let store = Arc::new(FsEntityStore::new(config.data_dir.clone()));
    AppState {
        policy: config.policy,
        codec: Arc::new(TokenCodec::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
        )),
        company: CompanyRepo::new(store.clone()),
        users: UserRepo::new(store.clone()),
        employees: EmployeeRepo::new(store.clone()),
        audit: AuditRepo::new(store.clone()),
        outbox: OutboxRepo::new(store.clone()),
        store,
        limiter: Arc::new(LoginLimiter::default()),
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: &AppConfig) -> Router {
    let state = build_state(config);
    build_router(state, config)
}

pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    // Protected routes: identity + tenant context required; role and trial
    // gates are composed per route inside each router fn.
    let protected = Router::new()
        .merge(routes::me::router(&state))
        .merge(routes::company::router(&state))
        .merge(routes::billing::router(&state))
        .merge(routes::audit::router(&state))
        .merge(routes::outbox::router(&state))
        .merge(routes::employees::router(&state))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_context,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/public/register-company",
            post(routes::public::register_company),
        )
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(error::attach_request_context))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
