//! Main harness server
//!
//! Wires the registry, publisher, runner and orchestrator together and
//! exposes them through an axum router.

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use shared::{Component, logging};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::services::{RealEventPublisher, RealSubscriberRegistry, SessionRunner, TestOrchestrator};
use crate::state::HarnessState;
use crate::traits::{EventPublisher, SubscriberRegistry};
use crate::web::handlers::{api, static_files, websocket};

/// Harness server with injected registry and publisher
pub struct HarnessServer<R, P>
where
    R: SubscriberRegistry,
    P: EventPublisher,
{
    state: Arc<HarnessState>,
    registry: Arc<R>,
    orchestrator: TestOrchestrator<P>,
}

impl<R, P> Clone for HarnessServer<R, P>
where
    R: SubscriberRegistry,
    P: EventPublisher,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            registry: Arc::clone(&self.registry),
            orchestrator: self.orchestrator.clone(),
        }
    }
}

/// Production wiring
pub type DefaultHarnessServer = HarnessServer<RealSubscriberRegistry, RealEventPublisher<RealSubscriberRegistry>>;

impl DefaultHarnessServer {
    /// Build a server backed by the real registry and publisher
    pub fn from_config(config: HarnessConfig) -> HarnessResult<Self> {
        config.validate()?;

        let state = Arc::new(HarnessState::new(config));
        let registry = Arc::new(RealSubscriberRegistry::new());
        let publisher = Arc::new(RealEventPublisher::new(Arc::clone(&registry)));
        let runner = SessionRunner::new(publisher, state.config.session_timeout)?;
        let orchestrator = TestOrchestrator::new(runner, Arc::clone(&state));

        Ok(Self::new(state, registry, orchestrator))
    }
}

impl<R, P> HarnessServer<R, P>
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(state: Arc<HarnessState>, registry: Arc<R>, orchestrator: TestOrchestrator<P>) -> Self {
        Self { state, registry, orchestrator }
    }

    pub fn state(&self) -> &Arc<HarnessState> {
        &self.state
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    pub fn orchestrator(&self) -> &TestOrchestrator<P> {
        &self.orchestrator
    }

    /// Build the axum router with all routes
    pub fn build_router(&self) -> Router {
        let static_dir = self.state.config.frontend_dir.join("static");

        Router::new()
            // Frontend
            .route("/", get(static_files::serve_index::<R, P>))
            .nest_service("/static", ServeDir::new(static_dir))

            // Subscriber channel
            .route("/ws", get(websocket::websocket_handler::<R, P>))

            // API routes
            .route("/api/start-test", post(api::start_test::<R, P>))
            .route("/api/status", get(api::status::<R, P>))

            // Health check
            .route("/health", get(api::health_check::<R, P>))

            .layer(
                ServiceBuilder::new()
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> HarnessResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let state = Arc::clone(&self.state);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                state.set_running(false);
            })
            .await
            .map_err(HarnessError::Io)
    }

    /// Bind the configured address and serve until Ctrl+C
    pub async fn run(self) -> HarnessResult<()> {
        let bind_address = self.state.config.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .map_err(|e| HarnessError::ServerStartup(format!("Failed to bind to {}: {}", bind_address, e)))?;

        logging::log_startup(Component::Server, &format!("harness on http://{}", bind_address));

        self.serve(listener, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => logging::log_shutdown(Component::Server, "Received Ctrl+C signal"),
                Err(err) => logging::log_error(Component::Server, "Signal handling", &err),
            }
        })
        .await
    }
}
