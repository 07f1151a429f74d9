//! ad-selector — picks the advertisement to render for one customer and
//! marketplace from a JSON catalog and prints it as JSON.

use adsel_core::config::{AppConfig, TieBreak};
use adsel_selection::Catalog;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ad-selector")]
#[command(about = "Select the best eligible advertisement for a customer and marketplace")]
#[command(version)]
struct Cli {
    /// Catalog of contents, targeting groups and customer profiles (JSON)
    #[arg(long, env = "AD_SELECTION__CATALOG")]
    catalog: PathBuf,

    /// Customer to select for (may be empty for anonymous requests)
    #[arg(long, default_value = "")]
    customer: String,

    /// Marketplace the advertisement renders on
    #[arg(long)]
    marketplace: String,

    /// Optional TOML/JSON config file, overlaid by AD_SELECTION__* variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tie-break policy on an exact score tie (overrides config)
    #[arg(long)]
    tie_break: Option<TieBreak>,

    /// Per-predicate timeout in milliseconds (overrides config)
    #[arg(long)]
    predicate_timeout_ms: Option<u64>,

    /// Maximum predicates evaluated at once (overrides config)
    #[arg(long)]
    max_concurrent_predicates: Option<usize>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = AppConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(tie_break) = cli.tie_break {
        config.selection.tie_break = tie_break;
    }
    if let Some(timeout_ms) = cli.predicate_timeout_ms {
        config.evaluator.predicate_timeout_ms = Some(timeout_ms);
    }
    if let Some(max) = cli.max_concurrent_predicates {
        config.evaluator.max_concurrent_predicates = max;
    }
    config.validate()?;

    info!(
        catalog = %cli.catalog.display(),
        tie_break = ?config.selection.tie_break,
        predicate_timeout_ms = ?config.evaluator.predicate_timeout_ms,
        "Configuration loaded"
    );

    let catalog = Catalog::from_path(&cli.catalog)?;
    let engine = catalog.engine(&config);

    let advertisement = engine
        .select_advertisement(&cli.customer, &cli.marketplace)
        .await?;

    println!("{}", serde_json::to_string_pretty(&advertisement)?);
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "ad_selector=info,adsel_selection=info,adsel_targeting=warn".into()
    });

    // Logs go to stderr so stdout carries only the result.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
