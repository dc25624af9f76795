//! Application state and route assembly.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crewbase_auth::http::{
    AuthHttpState, authorize_metadata_handler, change_password_handler, force_logout_handler,
    login_authorize_handler, logout_handler, me_handler, token_handler,
};
use crewbase_auth::middleware::{AuthState, stamp_session_version};
use crewbase_auth::oauth::{AuthorizationService, AuthorizeConfig};
use crewbase_auth::storage::memory::{
    InMemoryClientStorage, InMemorySessionStorage, InMemorySessionVersionStorage,
    InMemoryTokenStorage, InMemoryUserStorage,
};
use crewbase_auth::storage::{
    ClientStorage, SessionStorage, SessionVersionStorage, TokenStorage, UserStorage,
};
use crewbase_auth::token::{TokenConfig, TokenService};

use crate::config::AppConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handler state for the OAuth and account endpoints.
    pub http: AuthHttpState,
    /// User storage, kept for bootstrap seeding.
    pub user_storage: Arc<dyn UserStorage>,
    /// Client storage, kept for bootstrap seeding.
    pub client_storage: Arc<dyn ClientStorage>,
}

impl AppState {
    /// Builds the application state from configuration, wiring the
    /// in-memory storage backends into the auth services.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let client_storage: Arc<dyn ClientStorage> = Arc::new(InMemoryClientStorage::new());
        let user_storage: Arc<dyn UserStorage> = Arc::new(InMemoryUserStorage::new());
        let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let token_storage: Arc<dyn TokenStorage> = Arc::new(InMemoryTokenStorage::new());
        let version_storage: Arc<dyn SessionVersionStorage> =
            Arc::new(InMemorySessionVersionStorage::new());

        let oauth = &config.auth.oauth;

        let authorization_service = Arc::new(AuthorizationService::new(
            client_storage.clone(),
            session_storage.clone(),
            AuthorizeConfig::default().with_code_lifetime(
                time_duration(oauth.authorization_code_lifetime),
            ),
        ));

        let token_service = Arc::new(TokenService::new(
            session_storage.clone(),
            token_storage.clone(),
            user_storage.clone(),
            version_storage.clone(),
            TokenConfig::default()
                .with_access_token_lifetime(time_duration(oauth.access_token_lifetime))
                .with_refresh_token_lifetime(time_duration(oauth.refresh_token_lifetime))
                .with_rotate_refresh_tokens(oauth.refresh_token_rotation),
        ));

        let auth = AuthState::new(token_service, token_storage, version_storage)
            .with_session_config(config.auth.session.clone());

        Self {
            http: AuthHttpState {
                auth,
                authorization_service,
                user_storage: user_storage.clone(),
                session_storage,
            },
            user_storage,
            client_storage,
        }
    }
}

fn time_duration(d: std::time::Duration) -> time::Duration {
    time::Duration::seconds(d.as_secs() as i64)
}

/// Assembles the application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let auth_state = state.http.auth.clone();

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/oauth/authorize", get(authorize_metadata_handler))
        .route("/oauth/authorize/login", post(login_authorize_handler))
        .route("/oauth/token", post(token_handler))
        .route("/auth/me", get(me_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/password", post(change_password_handler))
        .route("/auth/users/{id}/force-logout", post(force_logout_handler))
        .with_state(state.http)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            stamp_session_version,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Builds the state, seeds bootstrap data, and serves until shutdown.
///
/// # Errors
///
/// Returns an error if seeding fails or the listener cannot bind.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);

    crate::bootstrap::seed(&state.user_storage, &state.client_storage, &config.bootstrap).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
