//! Model-family knowledge: catalog filtering, per-family invocation
//! payloads, completion normalization, and the gateway transport seam.

pub mod catalog;
pub mod client;
pub mod invoke;

pub use catalog::{dedupe_catalog, is_invocable, should_hide, ModelSummary};
pub use client::{HttpGateway, ModelGateway};
pub use invoke::{
    build_request, completion_text, normalize_completion, ModelError, ModelFamily,
};
