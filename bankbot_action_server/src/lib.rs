use axum::{Router, routing};
use bankbot_core::{ActionSet, BoxError};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use structured_logger::unix_ms;
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod handler;
pub mod types;

use handler::*;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct ServerBuilder {
    app_name: String,
    app_version: String,
    addr: String,
    actions: ActionSet,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating a new action server.
impl ServerBuilder {
    /// Creates a new ServerBuilder with default values.
    pub fn new() -> Self {
        ServerBuilder {
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
            addr: "127.0.0.1:5055".to_string(),
            actions: ActionSet::new(),
        }
    }

    pub fn with_app_name(mut self, app_name: String) -> Self {
        self.app_name = app_name;
        self
    }

    pub fn with_app_version(mut self, app_version: String) -> Self {
        self.app_version = app_version;
        self
    }

    pub fn with_addr(mut self, addr: String) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_actions(mut self, actions: ActionSet) -> Self {
        self.actions = actions;
        self
    }

    /// Builds the HTTP routes served to the conversational runtime.
    pub fn router(self) -> Result<Router, BoxError> {
        if self.actions.is_empty() {
            return Err("no actions registered".into());
        }

        let state = AppState {
            actions: Arc::new(self.actions),
            app_name: self.app_name,
            app_version: self.app_version,
            start_time_ms: unix_ms(),
        };
        Ok(Router::new()
            .route("/health", routing::get(get_health))
            .route("/actions", routing::get(get_actions))
            .route("/webhook", routing::post(run_action))
            .with_state(state))
    }

    pub async fn serve(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), BoxError> {
        let addr: SocketAddr = self.addr.parse()?;
        let app_name = self.app_name.clone();
        let app_version = self.app_version.clone();
        let app = self.router()?;

        let listener = create_reuse_port_listener(addr).await?;
        log::warn!("{}@{} listening on {:?}", app_name, app_version, addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        Ok(())
    }
}

pub async fn shutdown_signal(cancel_token: CancellationToken, wait_duration: Duration) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                log::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = cancel_token.cancelled() => {},
    }

    log::warn!("received termination signal, starting graceful shutdown");
    cancel_token.cancel();
    tokio::time::sleep(wait_duration).await;
}

pub async fn create_reuse_port_listener(
    addr: SocketAddr,
) -> Result<tokio::net::TcpListener, BoxError> {
    let socket = match &addr {
        SocketAddr::V4(_) => tokio::net::TcpSocket::new_v4()?,
        SocketAddr::V6(_) => tokio::net::TcpSocket::new_v6()?,
    };

    #[cfg(unix)]
    socket.set_reuseport(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(1024)?;
    Ok(listener)
}
