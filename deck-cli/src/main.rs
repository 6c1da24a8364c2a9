//! # Saorsa Deck CLI
//!
//! Headless tools for presentation files.

use clap::Parser;
use deck_cli::{commands, CliArgs, CliConfig, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,deck_core=debug,deck_renderer=debug".into());
    let json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // Logs go to stderr so command output can be piped.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::from_args(&args)?;
    tracing::debug!(
        width = config.editor.canvas.width,
        height = config.editor.canvas.height,
        "Canvas config"
    );

    match args.command {
        Command::New { output, slides } => {
            commands::new_presentation(&config, &output, slides)?;
            println!("{}", output.display());
        }
        Command::Inspect { input, json } => {
            let mut stdout = std::io::stdout().lock();
            commands::inspect(&config, &input, json, &mut stdout)?;
        }
        Command::Thumbnails { input, out, scale } => {
            for path in commands::thumbnails(&config, &input, &out, scale)? {
                println!("{}", path.display());
            }
        }
        Command::Normalize { input, output } => {
            let path = commands::normalize(&config, &input, output.as_deref()).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
