//! Chart Spec Harness CLI
//!
//! Compiles prompts against a catalog and prints the resulting
//! specifications as JSON, one document per prompt.
//!
//! Usage:
//!   cargo run --features cli --bin chartspec_harness -- \
//!     "Show me the top 5 geographic regions by revenue in a donut chart"
//!
//!   # Prompts from stdin, custom catalog, full stage trace
//!   cat prompts.txt | cargo run --features cli --bin chartspec_harness -- \
//!     --catalog config/catalog.yaml --trace
//!
//! Logs go to stderr (`RUST_LOG=chartspec=debug` for per-stage events) so
//! stdout stays machine-readable.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use chartspec::{CatalogSnapshot, ChartCompiler, CompilerConfig};

/// Prompt-to-chart-specification compiler harness
#[derive(Parser, Debug)]
#[command(name = "chartspec_harness")]
#[command(about = "Compile natural-language prompts into chart specifications")]
struct Args {
    /// Prompts to compile (read from stdin, one per line, when omitted)
    prompts: Vec<String>,

    /// Catalog YAML (defaults to the built-in demonstration catalog)
    #[arg(long, env = "CHARTSPEC_CATALOG")]
    catalog: Option<PathBuf>,

    /// Compiler config YAML (weights, alternatives, reference date)
    #[arg(long, env = "CHARTSPEC_CONFIG")]
    config: Option<PathBuf>,

    /// Print every pipeline stage instead of just the specification
    #[arg(long)]
    trace: bool,

    /// Print catalog statistics and exit
    #[arg(long)]
    stats: bool,

    /// Compact JSON (one line per prompt)
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => CatalogSnapshot::load_yaml(path)?,
        None => CatalogSnapshot::builtin().context("Built-in catalog is invalid")?,
    };

    if args.stats {
        print!("{}", catalog.stats());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => CompilerConfig::load_yaml(path)?,
        None => CompilerConfig::default(),
    };
    let compiler = ChartCompiler::new(config);

    let prompts = if args.prompts.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read prompts from stdin")?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        args.prompts.clone()
    };

    let mut stdout = io::stdout().lock();
    let mut failures = 0usize;

    for prompt in &prompts {
        let document = if args.trace {
            compiler
                .compile_traced(prompt, &catalog)
                .map(|trace| serde_json::to_value(trace))
        } else {
            compiler
                .compile(prompt, &catalog)
                .map(|spec| serde_json::to_value(spec))
        };

        let value = match document {
            Ok(value) => value.context("Failed to serialize result")?,
            Err(e) => {
                failures += 1;
                tracing::warn!(prompt = %prompt, error = %e, "compile failed");
                serde_json::json!({ "prompt": prompt, "error": e })
            }
        };

        let rendered = if args.compact {
            serde_json::to_string(&value)?
        } else {
            serde_json::to_string_pretty(&value)?
        };
        writeln!(stdout, "{rendered}")?;
    }

    if failures > 0 {
        tracing::warn!(failures, total = prompts.len(), "some prompts did not compile");
    }

    Ok(())
}
