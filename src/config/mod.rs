use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4400;
const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8808";
const DEFAULT_MODEL_ID: &str = "deepseek.r1-v1:0";
const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── ServiceConfig ───────────────────────────────────────────────────────────

/// Runtime configuration for the fortune host.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// REST server port (default: 4400).
    pub port: u16,
    /// Data directory holding config.toml.
    pub data_dir: PathBuf,
    /// Log level filter string, e.g. "debug", "info,fortuned=trace" (default: "info").
    pub log: String,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    pub log_format: String,
    /// Bind address for the REST server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    pub bind_address: String,
    /// Base URL of the model gateway — a runtime-compatible HTTP proxy in
    /// front of the model service; signing happens there, not here.
    pub gateway_url: String,
    /// Bearer token sent to the gateway. None = unauthenticated gateway.
    pub api_token: Option<String>,
    /// Model invoked when a fortune request names none (default: deepseek.r1-v1:0).
    pub default_model_id: String,
    /// Token cap passed in every invocation payload (default: 512).
    pub max_tokens: u32,
    /// Gateway request timeout in seconds (default: 30).
    pub request_timeout_secs: u64,
}

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// REST server port (default: 4400).
    port: Option<u16>,
    /// Log level filter string (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" | "json".
    log_format: Option<String>,
    /// Bind address for the REST server (default: "127.0.0.1").
    bind_address: Option<String>,
    /// Model gateway base URL.
    gateway_url: Option<String>,
    /// Bearer token for the gateway. Omit for an unauthenticated gateway.
    api_token: Option<String>,
    /// Default model id for fortune requests.
    default_model_id: Option<String>,
    /// Token cap for invocation payloads (default: 512).
    max_tokens: Option<u32>,
    /// Gateway request timeout in seconds (default: 30).
    request_timeout_secs: Option<u64>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

impl ServiceConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("FORTUNED_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let bind_address = bind_address
            .or(std::env::var("FORTUNED_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let gateway_url = std::env::var("FORTUNED_GATEWAY_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.gateway_url)
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

        let api_token = std::env::var("FORTUNED_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.api_token);

        let default_model_id = std::env::var("FORTUNED_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.default_model_id)
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        let max_tokens = toml.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let request_timeout_secs = toml.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            port,
            data_dir,
            log,
            log_format,
            bind_address,
            gateway_url,
            api_token,
            default_model_id,
            max_tokens,
            request_timeout_secs,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/fortuned
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("fortuned");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/fortuned or ~/.local/share/fortuned
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join("fortuned");
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("fortuned");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\fortuned
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("fortuned");
        }
    }
    // Last resort: a dotdir next to wherever we run
    PathBuf::from(".fortuned")
}
