//! Axum-based RPC server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use reunite_verification::{CaseWorkflow, VerificationError};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    workflow: Arc<CaseWorkflow>,
}

impl AppState {
    pub fn new(workflow: Arc<CaseWorkflow>) -> Self {
        Self { workflow }
    }

    /// Run a workflow call on the blocking pool. LMDB commits fsync, so
    /// workflow calls never run on the async workers.
    pub async fn run<T, F>(&self, f: F) -> Result<T, RpcError>
    where
        F: FnOnce(&CaseWorkflow) -> Result<T, VerificationError> + Send + 'static,
        T: Send + 'static,
    {
        let workflow = Arc::clone(&self.workflow);
        tokio::task::spawn_blocking(move || f(&workflow))
            .await
            .map_err(|e| RpcError::Server(format!("workflow task failed: {e}")))?
            .map_err(RpcError::from)
    }
}

pub struct RpcServer {
    pub listen: SocketAddr,
    pub enable_cors: bool,
}

impl RpcServer {
    pub fn new(listen: SocketAddr) -> Self {
        Self {
            listen,
            enable_cors: false,
        }
    }

    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// All routes, without CORS.
    pub fn router(workflow: Arc<CaseWorkflow>) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/cases", post(handlers::create_case).get(handlers::list_cases))
            .route("/cases/disputes", get(handlers::dispute_queue))
            .route("/cases/:id", get(handlers::get_case))
            .route("/cases/:id/evidence", post(handlers::submit_evidence))
            .route("/cases/:id/decision", post(handlers::decide))
            .route("/cases/:id/dispute", post(handlers::open_dispute))
            .route("/cases/:id/ruling", post(handlers::rule_dispute))
            .route(
                "/cases/:id/messages",
                post(handlers::post_message).get(handlers::read_messages),
            )
            .with_state(AppState::new(workflow))
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start(
        &self,
        workflow: Arc<CaseWorkflow>,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let mut router = Self::router(workflow);
        if self.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        let listener = TcpListener::bind(self.listen)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.listen)))?;
        let local = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!(addr = %local, cors = self.enable_cors, "RPC server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;

        info!("RPC server stopped");
        Ok(())
    }
}
