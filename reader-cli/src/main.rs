//! # Page Reader
//!
//! Command-line page reader: detect, select, crop and export one card.

use clap::Parser;
use reader_cli::{run, CliArgs, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing on stderr; stdout is reserved for exported cards.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,reader_core=debug,reader_renderer=debug,reader_cli=debug")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format for log shipping (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::from(args);
    tracing::debug!(?config, "Starting page reader");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = rt.block_on(run(config))?;

    tracing::info!(
        page = summary.page,
        regions = summary.regions,
        selected = summary.selected,
        gestures = summary.gestures_applied,
        sentence = %summary.sentence,
        "Run finished"
    );

    if !summary.exported {
        anyhow::bail!("card export abandoned: page image unavailable");
    }
    Ok(())
}
