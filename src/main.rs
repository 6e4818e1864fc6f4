use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gemini_ocr::ai::mime::detect_image_mime;
use gemini_ocr::ai::{GeminiOcrClient, TextExtractionService};
use gemini_ocr::server::{self, AppState, NO_TEXT_MESSAGE};
use gemini_ocr::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-ocr")]
#[command(about = "Extract text from images with Gemini")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP upload server.
    Serve {
        /// Address to bind, overrides OCR_BIND_ADDR.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Extract text from a local image file and print it.
    Extract {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// MIME type to send; detected from the file contents when omitted.
        #[arg(long, value_name = "TYPE")]
        mime_type: Option<String>,
    },
}

fn resolve_mime_type(explicit: Option<String>, bytes: &[u8], path: &Path) -> Result<String> {
    match explicit {
        Some(mime) => Ok(mime),
        None => detect_image_mime(bytes).map(str::to_string).with_context(|| {
            format!(
                "Could not detect image type of {}; pass --mime-type",
                path.display()
            )
        }),
    }
}

async fn run(args: CliArgs, config: Config) -> Result<()> {
    let client = GeminiOcrClient::from_config(&config);

    match args.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            server::serve(AppState::new(Arc::new(client)), &addr).await?;
        }
        Command::Extract { path, mime_type } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let mime_type = resolve_mime_type(mime_type, &bytes, &path)?;

            let text = client.extract_text(&bytes, &mime_type).await;
            if text.is_empty() {
                println!("{}", NO_TEXT_MESSAGE);
            } else {
                println!("{}", text);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_ocr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Starting gemini-ocr (model: {})", config.model);

    if let Err(e) = run(args, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
