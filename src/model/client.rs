//! Gateway transport.
//!
//! The host talks to a runtime-compatible HTTP proxy in front of the model
//! service; request signing is the proxy's concern, so this client speaks
//! plain HTTPS with an optional bearer token. `ModelGateway` is the seam —
//! tests substitute an in-process stub.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::catalog::ModelSummary;
use super::invoke::ModelError;

/// Transport to the model service.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Invoke `model_id` with its family-native request body, returning the
    /// family-native response body.
    async fn invoke(&self, model_id: &str, body: Value) -> Result<Value, ModelError>;

    /// Fetch the raw foundation-model catalog.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ModelError>;
}

/// reqwest-backed gateway client.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl ModelGateway for HttpGateway {
    async fn invoke(&self, model_id: &str, body: Value) -> Result<Value, ModelError> {
        let url = format!("{}/model/{}/invoke", self.base_url, model_id);
        debug!(model_id, "invoking model");
        let resp = self.with_auth(self.client.post(&url).json(&body)).send().await?;
        read_json(resp).await
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, ModelError> {
        let url = format!("{}/foundation-models", self.base_url);
        debug!("fetching foundation-model catalog");
        let resp = self.with_auth(self.client.get(&url)).send().await?;
        let listing = read_json(resp).await?;

        let summaries = listing
            .get("modelSummaries")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(summaries).map_err(|e| {
            ModelError::MalformedResponse(format!("bad modelSummaries entry: {e}"))
        })
    }
}

/// Turn a gateway response into JSON, mapping non-success statuses to
/// `ModelError::Gateway` with the body preserved for the log.
async fn read_json(resp: reqwest::Response) -> Result<Value, ModelError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ModelError::Gateway {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json::<Value>().await?)
}
