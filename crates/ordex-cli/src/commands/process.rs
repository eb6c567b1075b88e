//! Process command - extract order lines from a single document.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use ordex_core::{OrderPipeline, SpreadsheetWriter};

use super::{load_config, print_order_summary, spinner, OutputOptions};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputOptions,

    /// Also print the extracted order as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.output.apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = spinner()?;
    pb.set_message("Starting OCR engine...");

    let pipeline = OrderPipeline::new(config.clone())?;

    pb.set_message("Running OCR and extraction...");
    let order = pipeline.process_file(&args.input)?;

    pb.set_message("Writing spreadsheet...");
    let mut writer = SpreadsheetWriter::new(config.output.clone());
    let written = writer.add(&order)?;
    let shared = writer.finish()?;

    pb.finish_and_clear();

    print_order_summary(&order);
    if let Some(path) = written.or(shared) {
        println!(
            "{} Output written to {}",
            style("✓").green(),
            path.display()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
