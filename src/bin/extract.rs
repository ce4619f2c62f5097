//! `extract` - CLI front-end for the block extraction pipeline.
//!
//! Reads a file (or stdin), runs it through [`blockextract::Pipeline`], and
//! prints the accepted blocks as JSON. A thin wrapper: all the actual logic
//! lives in the library.

use std::fs;
use std::io::Read;
use std::io::{self};
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;

use blockextract::Pipeline;
use blockextract::PipelineConfig;

#[derive(Parser)]
#[command(name = "extract")]
#[command(about = "Extract validated code/config/log blocks from a text document")]
struct Cli {
    /// File to read. Omit (or pass `-`) to read from stdin.
    path: Option<PathBuf>,

    /// Also print rejected blocks and why they were filtered.
    #[arg(long)]
    show_rejected: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (text, filename) = match &cli.path {
        Some(path) if path.as_os_str() != "-" => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
            (content, filename)
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            (buf, None)
        }
    };

    let config = PipelineConfig::default();
    config.validate().context("invalid pipeline configuration")?;

    let pipeline = Pipeline::with_config(config);
    let report = pipeline
        .extract(&text, filename.as_deref())
        .context("extraction failed")?;

    let output = if cli.show_rejected {
        serde_json::json!({
            "accepted": report.accepted,
            "rejected": report.rejected,
        })
    } else {
        serde_json::json!({ "accepted": report.accepted })
    };

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}
