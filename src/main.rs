use std::io::Read as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use fortuned::config::ServiceConfig;
use fortuned::model::HttpGateway;
use fortuned::{extract, rest, AppContext};

#[derive(Parser)]
#[command(
    name = "fortuned",
    about = "Fortune Host — HTTP service fronting managed text-generation models",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST server port
    #[arg(long, env = "FORTUNED_PORT")]
    port: Option<u16>,

    /// Data directory for config.toml
    #[arg(long, env = "FORTUNED_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FORTUNED_LOG")]
    log: Option<String>,

    /// Bind address for the REST server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "FORTUNED_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "FORTUNED_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST server (default when no subcommand given).
    ///
    /// Runs fortuned in the foreground.
    ///
    /// Examples:
    ///   fortuned serve
    ///   fortuned
    Serve,
    /// Extract tagged spans from text on stdin or a file.
    ///
    /// Runs the same tag scanner the fortune route uses, offline, and
    /// prints the result as JSON.
    ///
    /// Examples:
    ///   fortuned extract --tag think --tag fortune < completion.txt
    ///   fortuned extract --tag fortune reply.txt
    Extract {
        /// Tag name to extract; repeat the flag for several tags.
        #[arg(long = "tag", value_name = "NAME")]
        tags: Vec<String>,

        /// Read from this file instead of stdin.
        file: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ── Logging setup ────────────────────────────────────────────────────────
    // Init once — must happen before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format =
        std::env::var("FORTUNED_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let _file_guard = setup_logging(&log_level, args.log_file.as_deref(), &log_format);

    match args.command {
        Some(Command::Extract { tags, file }) => run_extract(&tags, file.as_deref())?,
        None | Some(Command::Serve) => {
            run_server(args.port, args.data_dir, args.log, args.bind_address).await?;
        }
    }

    Ok(())
}

async fn run_server(
    port: Option<u16>,
    data_dir: Option<std::path::PathBuf>,
    log: Option<String>,
    bind_address: Option<String>,
) -> Result<()> {
    let config = ServiceConfig::new(port, data_dir, log, bind_address);
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let gateway = Arc::new(HttpGateway::new(
        &config.gateway_url,
        config.api_token.clone(),
        timeout,
    )?);

    info!(
        gateway = %config.gateway_url,
        model = %config.default_model_id,
        "fortuned starting"
    );

    let ctx = Arc::new(AppContext::new(config, gateway));
    rest::start_rest_server(ctx).await
}

fn run_extract(tags: &[String], file: Option<&Path>) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
    let result = extract::extract(&input, &tag_refs);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("fortuned.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
        }
        Some(guard)
    } else {
        if use_json {
            tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        } else {
            tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        }
        None
    }
}
