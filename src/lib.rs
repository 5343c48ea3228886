//! # fortuned
//!
//! Fortune Host — an always-on HTTP service that fronts managed
//! text-generation models. It picks the invocation payload shape for a
//! model's family, normalizes the reply, strips reasoning tags, and serves
//! the result over a small REST API.

pub mod config;
pub mod extract;
pub mod fortune;
pub mod model;
pub mod rest;

use std::sync::Arc;

use config::ServiceConfig;
use fortune::FortuneService;
use model::ModelGateway;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServiceConfig>,
    pub gateway: Arc<dyn ModelGateway>,
    pub fortune: Arc<FortuneService>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Wire the context from config + a gateway implementation.
    pub fn new(config: ServiceConfig, gateway: Arc<dyn ModelGateway>) -> Self {
        let fortune = Arc::new(FortuneService::new(
            gateway.clone(),
            config.default_model_id.clone(),
            config.max_tokens,
        ));
        Self {
            config: Arc::new(config),
            gateway,
            fortune,
            started_at: std::time::Instant::now(),
        }
    }
}
