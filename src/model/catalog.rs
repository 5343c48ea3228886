//! Foundation-model catalog shapes and listing hygiene.
//!
//! The gateway's listing is the raw vendor catalog: every minor version of
//! every model, embedding models included. The helpers here reduce it to
//! what a text-generation client can actually use.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::invoke::ModelFamily;

/// One entry from the gateway's `GET /foundation-models` listing. Field
/// names follow the catalog wire shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSummary {
    pub model_id: String,
    pub model_name: String,
    pub provider_name: String,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub inference_types_supported: Vec<String>,
    pub response_streaming_supported: bool,
    pub model_lifecycle: ModelLifecycle,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelLifecycle {
    pub status: String,
}

/// Models the catalog should not list at all: no text output,
/// provisioned-only capacity, or a retired lifecycle.
pub fn should_hide(model: &ModelSummary) -> bool {
    !model.output_modalities.iter().any(|m| m == "TEXT")
        || model
            .inference_types_supported
            .iter()
            .any(|t| t == "PROVISIONED")
        || model.model_lifecycle.status != "ACTIVE"
}

/// Whether this host knows how to build an invocation payload for the model:
/// it must take text input and belong to a known family.
pub fn is_invocable(model: &ModelSummary) -> bool {
    model.input_modalities.iter().any(|m| m == "TEXT")
        && ModelFamily::detect(&model.model_id) != ModelFamily::Unknown
}

/// Model id with the minor-version suffix dropped (`:0`, `:1`, …).
pub fn base_model_id(model_id: &str) -> &str {
    model_id.split(':').next().unwrap_or(model_id)
}

/// Collapse minor versions of the same base model, keeping the first
/// occurrence in listing order.
pub fn dedupe_catalog(models: Vec<ModelSummary>) -> Vec<ModelSummary> {
    let mut seen: HashSet<String> = HashSet::new();
    models
        .into_iter()
        .filter(|m| seen.insert(base_model_id(&m.model_id).to_string()))
        .collect()
}
