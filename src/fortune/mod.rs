//! Fortune generation.
//!
//! Prompts the configured model, normalizes its reply, and cuts the fortune
//! out of the tagged response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extract::extract;
use crate::model::{
    build_request, completion_text, normalize_completion, ModelError, ModelFamily, ModelGateway,
};

/// The one prompt this host sends. The tag gives the extractor a stable
/// envelope to cut the reply out of, whatever else the model wraps around it.
const FORTUNE_PROMPT: &str = "Give me a short fortune cookie message. \
    Put the fortune itself inside <fortune> tags and nothing else.";

/// A generated fortune, as served by `POST /api/v1/fortune`.
#[derive(Debug, Clone, Serialize)]
pub struct Fortune {
    pub fortune: String,
    #[serde(rename = "modelId")]
    pub model_id: String,
    pub timestamp: DateTime<Utc>,
}

pub struct FortuneService {
    gateway: Arc<dyn ModelGateway>,
    default_model_id: String,
    max_tokens: u32,
}

impl FortuneService {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        default_model_id: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            gateway,
            default_model_id: default_model_id.into(),
            max_tokens,
        }
    }

    /// Ask `model_id` (or the configured default) for a fortune.
    ///
    /// The reply is normalized for the model's family (reasoning blocks
    /// stripped), then the first `<fortune>` span becomes the fortune.
    /// Models that ignore the tag instruction reply in plain text, so the
    /// untagged remainder is the fallback.
    pub async fn tell(&self, model_id: Option<&str>) -> Result<Fortune, ModelError> {
        let model_id = model_id.unwrap_or(&self.default_model_id);
        let request_id = format!("fortune-req-{}", Uuid::new_v4());
        let family = ModelFamily::detect(model_id);
        let body = build_request(model_id, FORTUNE_PROMPT, self.max_tokens)?;

        info!(%request_id, model_id, ?family, "requesting fortune");
        let response = self.gateway.invoke(model_id, body).await?;
        let raw = completion_text(family, &response)?;
        let text = normalize_completion(family, &raw);

        let parsed = extract(&text, &["fortune"]);
        let fortune = match parsed.first("fortune") {
            Some(tagged) => tagged.to_string(),
            None => parsed.leftover_text().to_string(),
        };
        if fortune.is_empty() {
            warn!(%request_id, model_id, "model returned an empty fortune");
        }

        Ok(Fortune {
            fortune,
            model_id: model_id.to_string(),
            timestamp: Utc::now(),
        })
    }
}
