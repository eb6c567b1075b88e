//! Batch processing command for a directory of order documents.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use ordex_core::input;
use ordex_core::{OrderPipeline, SpreadsheetWriter};

use super::{abort_with, finish_output, load_config, OutputOptions};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory to scan (default: input.directory from the configuration)
    directory: Option<PathBuf>,

    /// Glob pattern matched inside the directory
    #[arg(short, long)]
    pattern: Option<String>,

    #[command(flatten)]
    output: OutputOptions,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    items: usize,
    warnings: usize,
    error: Option<String>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.output.apply(&mut config);
    if let Some(directory) = &args.directory {
        config.input.directory = directory.clone();
    }
    if let Some(pattern) = &args.pattern {
        config.input.pattern = pattern.clone();
    }

    let files = input::discover(&config.input.directory, &config.input.pattern)?;

    if files.is_empty() {
        anyhow::bail!(
            "No matching files found for {} in {}",
            config.input.pattern,
            config.input.directory.display()
        );
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pipeline = OrderPipeline::new(config.clone())?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut writer = SpreadsheetWriter::new(config.output.clone());
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let outcome = pipeline
            .process_file(&path)
            .map_err(anyhow::Error::from)
            .and_then(|order| {
                writer.add(&order)?;
                Ok(order)
            });

        match outcome {
            Ok(order) => results.push(ProcessResult {
                path,
                items: order.details.len(),
                warnings: order.warnings.len(),
                error: None,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        items: 0,
                        warnings: 0,
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    pb.abandon();
                    return Err(abort_with(
                        writer,
                        anyhow::anyhow!("Processing failed for {}: {}", path.display(), error_msg),
                    ));
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    finish_output(writer)?;

    let successful: Vec<_> = results.iter().filter(|r| r.error.is_none()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} item rows, {} warnings",
        style(successful.len()).green(),
        style(failed.len()).red(),
        successful.iter().map(|r| r.items).sum::<usize>(),
        successful.iter().map(|r| r.warnings).sum::<usize>()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}
