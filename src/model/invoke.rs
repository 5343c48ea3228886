//! Per-family invocation payloads and reply normalization.
//!
//! Hosted foundation models keep their vendor-native request/response
//! bodies, so invoking one means choosing the right JSON shape for its
//! family and knowing where the generated text lives in the reply. A
//! handful of branches, not a provider abstraction layer.

use serde_json::{json, Value};

use crate::extract::filter_out_think;

// ─── ModelFamily ─────────────────────────────────────────────────────────────

/// Vendor family of a foundation model, read from the model id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Anthropic,
    DeepSeek,
    Meta,
    Mistral,
    Titan,
    Nova,
    Unknown,
}

impl ModelFamily {
    /// Detect the family from a model id such as
    /// `anthropic.claude-3-7-sonnet-20250219-v1:0` or `deepseek.r1-v1:0`.
    ///
    /// Cross-region inference-profile prefixes (`us.`, `eu.`, `apac.`) are
    /// skipped before the vendor segment is read. The `amazon.` vendor
    /// splits on the second segment: `amazon.titan-…` vs `amazon.nova-…`.
    pub fn detect(model_id: &str) -> Self {
        let id = model_id
            .strip_prefix("us.")
            .or_else(|| model_id.strip_prefix("eu."))
            .or_else(|| model_id.strip_prefix("apac."))
            .unwrap_or(model_id);
        let mut segments = id.split('.');
        let vendor = segments.next().unwrap_or("");
        let product = segments.next().unwrap_or("");

        match vendor {
            "anthropic" => Self::Anthropic,
            "deepseek" => Self::DeepSeek,
            "meta" => Self::Meta,
            "mistral" => Self::Mistral,
            "amazon" if product.starts_with("titan") => Self::Titan,
            "amazon" if product.starts_with("nova") => Self::Nova,
            _ => Self::Unknown,
        }
    }

    /// Families that interleave `<think>` reasoning blocks with the visible
    /// reply.
    pub fn is_reasoning(self) -> bool {
        matches!(self, Self::DeepSeek)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors from building payloads, talking to the gateway, or reading replies.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model id belongs to no family this host can build a payload for.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),
    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {body}")]
    Gateway { status: u16, body: String },
    /// Transport-level failure reaching the gateway.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The reply parsed as JSON but the expected fields were missing.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

// ─── Request shapes ──────────────────────────────────────────────────────────

/// Build the native `InvokeModel` body for `model_id`.
///
/// Messages-shaped families (Anthropic, Nova) get a single user turn;
/// prompt-shaped families get the prompt verbatim — chat templating is the
/// model gateway's business, not ours.
pub fn build_request(model_id: &str, prompt: &str, max_tokens: u32) -> Result<Value, ModelError> {
    let body = match ModelFamily::detect(model_id) {
        ModelFamily::Anthropic => json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": max_tokens,
            "messages": [{
                "role": "user",
                "content": [{ "type": "text", "text": prompt }],
            }],
        }),
        ModelFamily::DeepSeek => json!({
            "prompt": prompt,
            "max_tokens": max_tokens,
        }),
        ModelFamily::Meta => json!({
            "prompt": prompt,
            "max_gen_len": max_tokens,
        }),
        ModelFamily::Mistral => json!({
            "prompt": prompt,
            "max_tokens": max_tokens,
        }),
        ModelFamily::Titan => json!({
            "inputText": prompt,
            "textGenerationConfig": { "maxTokenCount": max_tokens },
        }),
        ModelFamily::Nova => json!({
            "messages": [{
                "role": "user",
                "content": [{ "text": prompt }],
            }],
            "inferenceConfig": { "maxTokens": max_tokens },
        }),
        ModelFamily::Unknown => {
            return Err(ModelError::UnsupportedModel(model_id.to_string()));
        }
    };
    Ok(body)
}

// ─── Response shapes ─────────────────────────────────────────────────────────

/// Pull the generated text out of a family's native response body.
pub fn completion_text(family: ModelFamily, response: &Value) -> Result<String, ModelError> {
    let text = match family {
        ModelFamily::Anthropic => response
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect::<String>()
            }),
        ModelFamily::DeepSeek => response
            .pointer("/choices/0/text")
            .and_then(Value::as_str)
            .map(str::to_string),
        ModelFamily::Meta => response
            .get("generation")
            .and_then(Value::as_str)
            .map(str::to_string),
        ModelFamily::Mistral => response
            .pointer("/outputs/0/text")
            .and_then(Value::as_str)
            .map(str::to_string),
        ModelFamily::Titan => response
            .pointer("/results/0/outputText")
            .and_then(Value::as_str)
            .map(str::to_string),
        ModelFamily::Nova => response
            .pointer("/output/message/content/0/text")
            .and_then(Value::as_str)
            .map(str::to_string),
        ModelFamily::Unknown => {
            return Err(ModelError::MalformedResponse(
                "no response shape for unknown model family".to_string(),
            ));
        }
    };

    text.ok_or_else(|| {
        ModelError::MalformedResponse(format!("{family:?} reply is missing its text field"))
    })
}

/// Normalize a completion into user-visible text: reasoning families get
/// their `<think>` blocks stripped, everyone gets trimmed.
pub fn normalize_completion(family: ModelFamily, text: &str) -> String {
    if family.is_reasoning() {
        filter_out_think(text)
    } else {
        text.trim().to_string()
    }
}
