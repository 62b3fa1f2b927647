pub mod conferences;
pub mod error;
pub mod json;
pub mod pagination;
pub mod permissions;
pub mod plugins;
pub mod routes;
pub mod session;
pub mod telemetry;

use core::future::Future;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::handler::Handler;
use axum::routing::{on, MethodFilter};
use axum::Router;
use error::AppError;
use plugins::PluginRegistry;
use routes::conferences::list::{course_conferences, group_conferences};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info};
use web_conferences_config::{ApiConfig, Config};
use web_conferences_database::pg::PgStore;
use web_conferences_database::{get_database_connection, ConferenceStore};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Arc<dyn ConferenceStore>,
    pub plugins: Arc<PluginRegistry>,
    pub api: ApiConfig,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ConferenceStore>, plugins: PluginRegistry, api: ApiConfig) -> Self {
        Self {
            store,
            plugins: Arc::new(plugins),
            api,
        }
    }
}

#[derive(Default)]
struct ApiRouter {
    router: Router<AppState>,
}

impl ApiRouter {
    #[track_caller]
    #[must_use]
    fn route<T: 'static, H: Handler<T, AppState>>(
        self,
        method: MethodFilter,
        path: &'static str,
        handler: H,
    ) -> Self {
        debug!("registering {method:?} {path}");
        Self {
            router: self.router.route(path, on(method, handler)),
        }
    }

    fn finish(self) -> Router<AppState> {
        self.router
    }
}

async fn not_found() -> AppError {
    AppError::NotFound
}

fn layers(app: Router) -> Router {
    // the outermost layer comes first
    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                // headers stay out of the logs, they carry access tokens
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::default())
                    .on_response(DefaultOnResponse::default()),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::new()),
    )
}

/// The api with all its layers.
pub fn app(state: AppState) -> Router {
    let app = ApiRouter::default()
        .route(
            MethodFilter::GET,
            "/api/v1/courses/:course_id/conferences",
            course_conferences,
        )
        .route(
            MethodFilter::GET,
            "/api/v1/groups/:group_id/conferences",
            group_conferences,
        )
        .finish()
        .fallback(not_found)
        .with_state(state);
    layers(app)
}

pub fn setup_server(config: &Config) -> Result<Router, AppError> {
    info!("setting up server...");

    let pool = get_database_connection(&config.database_url)?;
    let plugins = PluginRegistry::builtin().with_providers(&config.conference_providers);
    for provider in plugins.providers() {
        debug!(
            "conference provider {} uses plugin {}",
            provider.conference_type, provider.plugin_id
        );
    }

    let state = AppState::new(Arc::new(PgStore::new(pool)), plugins, config.api.clone());
    Ok(app(state))
}

/// Serves `app` until `shutdown` completes, then waits for open requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

pub async fn run_server(config: &Config) -> Result<(), AppError> {
    let app = setup_server(config)?;
    let listener = TcpListener::bind(config.listen_address).await?;
    serve(listener, app, shutdown_signal()).await
}

/// Ctrl+C or SIGTERM.
#[allow(clippy::redundant_pub_crate)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {err}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutting down...");
}
