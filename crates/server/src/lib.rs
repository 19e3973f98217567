//! TWAP Execution Service
//!
//! Accepts TWAP requests over a WebSocket channel and runs each as a timed
//! sequence of equal slice orders, streaming progress back to the client.
//!
//! # Architecture
//!
//! - **Config**: JSON service configuration (`ServiceConfig`)
//! - **Presentation**: health route and the `/ws-twap` channel adapter
//! - Sessions and the per-connection registry live in `twap-engine`; order
//!   placement goes through the `twap-ports` traits, backed here by the
//!   `twap-gateway` paper venue unless another venue is supplied
//!
//! # Example
//!
//! ```ignore
//! use twap_server::{ServiceConfig, TwapServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = TwapServer::new(ServiceConfig::default());
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod presentation;

pub use config::{ConfigError, ServerConfig, ServiceConfig};
pub use presentation::{HealthResponse, WsState, create_router};

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use twap_engine::SessionRegistry;
use twap_gateway::PaperExecutor;
use twap_ports::{BalanceSource, OrderExecutor};

/// The TWAP server
pub struct TwapServer {
    pub config: ServiceConfig,
    registry: SessionRegistry,
}

impl TwapServer {
    /// Server backed by the configured paper venue
    pub fn new(config: ServiceConfig) -> Self {
        let venue = Arc::new(PaperExecutor::new(&config.paper));
        Self::with_venue(config, venue)
    }

    /// Server placing slices on `venue`, which also supplies reference sizes
    pub fn with_venue<V>(config: ServiceConfig, venue: Arc<V>) -> Self
    where
        V: OrderExecutor + BalanceSource + 'static,
    {
        let registry = SessionRegistry::new(venue.clone(), venue, config.session.clone());
        Self { config, registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Create the HTTP router
    pub fn router(&self) -> Router {
        create_router(Arc::new(WsState {
            registry: self.registry.clone(),
            outbound_capacity: self.config.server.outbound_capacity,
        }))
    }

    /// Run the server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.bind_addr();
        let router = self.router();

        tracing::info!("{} listening on {}", self.config.name, addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
