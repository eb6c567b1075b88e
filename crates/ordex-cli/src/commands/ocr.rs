//! OCR command - dump the recognized lines of a document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use ordex_core::OrderPipeline;

use super::{load_config, spinner};

/// Arguments for the ocr command.
#[derive(Args)]
pub struct OcrArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep non-canonical filenames instead of renaming them
    #[arg(long)]
    no_rename: bool,
}

pub fn run(args: OcrArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.no_rename {
        config.input.rename = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let pb = spinner()?;
    pb.set_message("Running OCR...");

    let pipeline = OrderPipeline::new(config)?;
    let document = pipeline.ocr_file(&args.input)?;

    pb.finish_and_clear();

    let json = serde_json::to_string_pretty(&document)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, json)?;
        println!(
            "{} {} lines written to {}",
            style("✓").green(),
            document.lines.len(),
            output_path.display()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}
