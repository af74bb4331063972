use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{Result, Context};
use document_ai_viewer as lib;
use lib::api::auth_info::{HttpAuthInfoProvider, StaticAuthInfo};
use lib::api::pkce::PkceGenerator;
use lib::api::reauth::ReauthFlow;
use lib::api::store::JsonFileStore;
use lib::api::AuthInfoProvider;
use lib::config::Config;
use lib::decode::Decoder;
use lib::display::{format_presentation, Presentation, TextOptions, ViewerContext};

#[derive(Parser)]
#[command(name = "document-ai-viewer", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an extraction response as tables
    Render {
        /// Response file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Expand the raw JSON section
        #[arg(long)]
        raw: bool,
    },
    /// Print a fresh PKCE verifier/challenge pair
    Pkce,
    /// Start re-authentication: store a verifier and print the authorize URL
    Reauth,
    /// Complete re-authentication from the redirect URL
    Callback {
        /// Full redirect URL, including the query string
        url: String,
    },
    /// Validate config file and exit
    ConfigValidate,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Bordered terminal tables
    Text,
    /// The rendered table set as JSON
    Json,
    /// Clean (tag-free) document JSON, as copied to the clipboard
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Explicit --config must exist; the default location is optional.
    let (cfg, config_path) = match &cli.config {
        Some(p) => (
            Config::from_path(p).with_context(|| format!("loading config from {}", p.display()))?,
            p.clone(),
        ),
        None => {
            let p = lib::config::default_config_path();
            if p.exists() {
                (Config::from_path(&p).with_context(|| format!("loading config from {}", p.display()))?, p)
            } else {
                (Config::default(), p)
            }
        }
    };

    // Logs go to stderr (stdout carries command output) and a daily-rotated
    // file in cfg.log_dir.
    let _ = LogTracer::init();
    let file_appender: RollingFileAppender = tracing_appender::rolling::daily(&cfg.log_dir, "document-ai-viewer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .expect("failed to set global tracing subscriber");

    match cli.command {
        Commands::Render { input, format, raw } => {
            let body = read_input(&input)?;
            let mut ctx = ViewerContext::new(Decoder::new(cfg.max_decode_depth));
            let presentation = ctx.show(&body);
            match (format, &presentation) {
                (OutputFormat::Text, p) => {
                    print!("{}", format_presentation(p, TextOptions { show_raw: raw }));
                }
                (OutputFormat::Json, Presentation::Tables(set)) => {
                    println!("{}", serde_json::to_string_pretty(set)?);
                }
                (OutputFormat::Clean, Presentation::Tables(_)) => {
                    if let Some(json) = ctx.copy_json() {
                        println!("{}", json);
                    }
                }
                (_, Presentation::RawText(text)) => {
                    eprintln!("Response is not a tagged JSON object; printing raw text.");
                    print!("{}", text);
                }
            }
        }
        Commands::Pkce => {
            let pair = PkceGenerator::default().generate()?;
            println!("code_verifier:         {}", pair.verifier);
            println!("code_challenge:        {}", pair.challenge);
            println!("code_challenge_method: {}", pair.method());
        }
        Commands::Reauth => {
            let flow = build_flow(&cfg);
            let provider: Box<dyn AuthInfoProvider> = match &cfg.auth_info_url {
                Some(base) => Box::new(HttpAuthInfoProvider::new(base.clone())),
                None => Box::new(StaticAuthInfo::new(cfg.auth_info())),
            };
            match flow.begin_with(provider.as_ref()).await {
                Ok(req) => {
                    println!("Open this URL in your browser and authorize the application:\n\n{}\n", req.url);
                    println!("After authorizing, copy the full redirect URL and run:");
                    println!("  document-ai-viewer callback '<redirect URL>'");
                }
                Err(e) if e.needs_configuration() => {
                    eprintln!("{}", e);
                    eprintln!(
                        "Authentication is not configured. Set login_url and client_id in {} (or LOGIN_URL / CLIENT_ID).",
                        config_path.display()
                    );
                    std::process::exit(2);
                }
                Err(e) => return Err(e).context("starting re-authentication"),
            }
        }
        Commands::Callback { url } => {
            let flow = build_flow(&cfg);
            let cb = flow.complete(&url).context("completing re-authentication")?;
            println!("{}", serde_json::to_string_pretty(&cb)?);
        }
        Commands::ConfigValidate => {
            match &cli.config {
                Some(p) => match Config::from_path(p) {
                    Ok(_) => println!("OK"),
                    Err(e) => {
                        eprintln!("Config validation failed: {}", e);
                        std::process::exit(2);
                    }
                },
                None => println!("OK"),
            }
        }
    }

    Ok(())
}

fn build_flow(cfg: &Config) -> ReauthFlow {
    ReauthFlow::new(
        PkceGenerator::default(),
        Arc::new(JsonFileStore::new(cfg.session_file.clone())),
        cfg.redirect_uri.clone(),
    )
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s).context("reading stdin")?;
        Ok(s)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))
    }
}
