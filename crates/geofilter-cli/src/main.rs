//! geofilter - translate CQL spatial predicates into PostGIS SQL
//!
//! Reads predicates such as `INTERSECTS(geom, POINT(10.0 20.0))` from the
//! command line or stdin (one per line) and prints one JSON translation
//! result per predicate.

use std::io::BufRead;

use anyhow::{bail, Context};
use clap::Parser;
use geofilter_cql::parse_predicate;
use geofilter_ir::SpatialPredicate;
use geofilter_pg::{PostgisTranslator, TranslationResult};
use geofilter_registry::PropertyRegistry;
use tracing::info;

mod config;
mod logging;

use config::Config;

/// Translate OGC spatial predicates into PostGIS WHERE-clause SQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Predicates to translate; read from stdin when none are given
    predicates: Vec<String>,

    /// Configuration file
    #[arg(long, env = "GEOFILTER_CONFIG", default_value = "config.yaml")]
    config: String,

    /// Property binding file (overrides the configuration)
    #[arg(long)]
    properties: Option<String>,

    /// AND all predicates into one result
    #[arg(long)]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    if let Some(properties) = cli.properties.clone() {
        config.resolver.properties = Some(properties);
    }

    config.apply_logging_env();
    logging::init();

    let Some(properties) = config.resolver.properties.as_deref() else {
        bail!("No property file configured; set resolver.properties, GEOFILTER_PROPERTIES or --properties");
    };
    let registry = PropertyRegistry::load(properties)
        .with_context(|| format!("Failed to load property bindings from {}", properties))?;
    info!(path = properties, bindings = registry.len(), "Property registry ready");

    let sources = if cli.predicates.is_empty() {
        read_stdin()?
    } else {
        cli.predicates
    };

    let predicates = sources
        .iter()
        .map(|source| {
            parse_predicate(source, &config.resolver.namespaces, config.resolver.default_type)
                .with_context(|| format!("Failed to parse predicate: {}", source))
        })
        .collect::<anyhow::Result<Vec<SpatialPredicate>>>()?;

    let translator = PostgisTranslator::new(&registry);

    if cli.all {
        let result = translator.translate_all(&predicates)?;
        print_result(&result)?;
    } else {
        for (source, predicate) in sources.iter().zip(&predicates) {
            let result = translator
                .translate(predicate)
                .with_context(|| format!("Failed to translate predicate: {}", source))?;
            crate::log_event!(
                level: tracing::Level::INFO,
                event: "predicate_translated",
                operator: predicate.operator.name(),
                tables: result.tables.len(),
            );
            print_result(&result)?;
        }
    }

    Ok(())
}

/// Non-empty stdin lines, skipping `#` comments
fn read_stdin() -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines)
}

fn print_result(result: &TranslationResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(result)?);
    Ok(())
}
