//! Server Implementation
//!
//! HTTP server startup, background schedulers and shutdown.

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use crate::core::{Config, ServerState};
use crate::services::{
    AbsenteeSweepScheduler, MeetingDigestScheduler, MeetingReminderScheduler, build_app,
};
use crate::utils::{AppError, AppResult};

/// HTTP Server
pub struct Server {
    state: ServerState,
}

impl Server {
    /// Create a server around already-initialized state
    pub fn with_state(state: ServerState) -> Self {
        Self { state }
    }

    /// Initialize state from the config and create the server
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let state = ServerState::initialize(config).await?;
        Ok(Self { state })
    }

    /// Serve until ctrl-c, then stop the schedulers
    pub async fn run(self) -> AppResult<()> {
        let shutdown = CancellationToken::new();
        self.spawn_schedulers(&shutdown);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Cannot bind {addr}: {e}")))?;
        tracing::info!("hq-server listening on {}", addr);

        let app = build_app(self.state);

        let serve_shutdown = shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                serve_shutdown.cancel();
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_schedulers(&self, shutdown: &CancellationToken) {
        tokio::spawn(AbsenteeSweepScheduler::new(self.state.clone(), shutdown.clone()).run());
        tokio::spawn(MeetingDigestScheduler::new(self.state.clone(), shutdown.clone()).run());
        tokio::spawn(MeetingReminderScheduler::new(self.state.clone(), shutdown.clone()).run());
    }
}
