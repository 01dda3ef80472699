//! CLI binary for plainlegal.
//!
//! A thin shim over the library crate: `serve` runs the HTTP API, and
//! `simplify` runs the same pipeline once on a local file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use plainlegal::api::{self, outward, ApiState};
use plainlegal::pipeline::upload::sniff_content_type;
use plainlegal::{Identity, Pipeline, PipelineConfig, Role, StaticTokenGate};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service
  plainlegal serve --bind 0.0.0.0:5000 --tokens "dev-token=u1:Dev:dev@example.com"

  # Simplify one local PDF
  plainlegal simplify lease.pdf

  # JSON output with both texts
  plainlegal simplify --json lease.pdf > lease.json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY           Google Gemini API key (required)
  PLAINLEGAL_MODEL         Model id (default gemini-1.5-pro)
  PLAINLEGAL_ENDPOINT      API root (default https://generativelanguage.googleapis.com/v1)
  PLAINLEGAL_API_TIMEOUT   Upstream deadline in seconds (default 30)
  PLAINLEGAL_MAX_UPLOAD    Upload ceiling in bytes (default 10485760)
  PLAINLEGAL_BIND          Listen address for `serve` (default 127.0.0.1:5000)
  PLAINLEGAL_TOKENS        Token table: token=user_id:name:email[:role],...
  PLAINLEGAL_CORS_ORIGINS  Comma-separated allowed origins (default: any)
  RUST_LOG                 Overrides -v / -q
"#;

#[derive(Parser, Debug)]
#[command(
    name = "plainlegal",
    version,
    about = "Simplify legal PDFs into plain English",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Debug-level logs.
    #[arg(short, long, global = true, env = "PLAINLEGAL_VERBOSE")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true, env = "PLAINLEGAL_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "PLAINLEGAL_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// Token table: `token=user_id:name:email[:role],...`.
        #[arg(long, env = "PLAINLEGAL_TOKENS", default_value = "", hide_env_values = true)]
        tokens: String,
    },

    /// Simplify a local PDF and print the result.
    Simplify {
        file: PathBuf,

        /// Print `{originalText, simplifiedText}` as JSON.
        #[arg(long)]
        json: bool,

        /// Hide the spinner.
        #[arg(long, env = "PLAINLEGAL_NO_PROGRESS")]
        no_progress: bool,
    },
}

#[derive(Args, Debug)]
struct PipelineArgs {
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "PLAINLEGAL_MODEL")]
    model: Option<String>,

    #[arg(long, global = true, env = "PLAINLEGAL_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, global = true, env = "PLAINLEGAL_API_TIMEOUT")]
    api_timeout: Option<u64>,

    #[arg(long, global = true, env = "PLAINLEGAL_MAX_UPLOAD")]
    max_upload: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers progress for `simplify`, so library info logs
    // are only shown there in verbose mode.
    let spinner_active = matches!(
        cli.command,
        Command::Simplify { json: false, no_progress: false, .. }
    ) && !cli.quiet;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || spinner_active {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.pipeline).context("Invalid configuration")?;
    let pipeline = Pipeline::new(&config).context("Failed to build pipeline")?;

    match cli.command {
        Command::Serve { bind, tokens } => {
            let gate = StaticTokenGate::from_table(&tokens).context("Invalid token table")?;
            if gate.is_empty() {
                tracing::warn!("No tokens configured; every /api request will be refused with 401");
            } else {
                tracing::info!("Loaded {} token(s)", gate.len());
            }
            tracing::info!("Using model {} with {}s deadline", config.model, config.api_timeout_secs);

            let state = ApiState::new(pipeline, Arc::new(gate));
            api::serve(bind, state).await.context("Server failed")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Simplify { file, json, no_progress } => {
            simplify_file(&pipeline, file, json, spinner_active && !no_progress).await
        }
    }
}

fn build_config(args: &PipelineArgs) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder().api_key(args.api_key.clone().unwrap_or_default());
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref endpoint) = args.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(secs) = args.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(bytes) = args.max_upload {
        builder = builder.max_upload_bytes(bytes);
    }
    Ok(builder.build()?)
}

async fn simplify_file(
    pipeline: &Pipeline,
    file: PathBuf,
    json: bool,
    show_progress: bool,
) -> Result<ExitCode> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    // The file is trusted local input; its type is asserted by the operator.
    let file_name = file.file_name().map(|n| n.to_string_lossy().into_owned());
    let content_type = sniff_content_type(&bytes);
    let operator = Identity::new("local", "Local operator", "").with_role(Role::Admin);

    let bar = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("Simplifying {}", file.display()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let outcome = pipeline
        .process_bytes(file_name, Some(content_type.to_string()), bytes, &operator)
        .await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            let (status, body) = outward(&e);
            eprintln!("{} {}", red("✘"), body.message);
            if let Some(details) = body.details.or(body.error) {
                eprintln!("  {}", dim(&details));
            }
            eprintln!("  {}", dim(&format!("{} ({})", e.kind(), status.as_u16())));
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        let out = serde_json::to_string_pretty(&result).context("Failed to serialise output")?;
        println!("{out}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.simplified_text.as_bytes())
            .context("Failed to write to stdout")?;
        if !result.simplified_text.ends_with('\n') {
            handle
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
        if show_progress {
            eprintln!(
                "{} {} chars → {} chars",
                green("✔"),
                result.original_text.chars().count(),
                result.simplified_text.chars().count()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
