//! Extract command - rerun extraction and output on an OCR dump.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use ordex_core::{OcrDocument, OrderParser, SpreadsheetWriter};

use super::{abort_with, finish_output, load_config, print_order_summary, OutputOptions};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR dumps written by `ordex ocr`
    #[arg(required = true)]
    dumps: Vec<PathBuf>,

    #[command(flatten)]
    output: OutputOptions,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.output.apply(&mut config);

    let parser = OrderParser::new(config.extraction.clone());
    let mut writer = SpreadsheetWriter::new(config.output.clone());

    for dump in &args.dumps {
        if let Err(e) = extract_dump(&parser, &mut writer, dump) {
            return Err(abort_with(writer, e));
        }
    }

    finish_output(writer)
}

fn extract_dump(
    parser: &OrderParser,
    writer: &mut SpreadsheetWriter,
    dump: &Path,
) -> anyhow::Result<()> {
    info!("Extracting from {}", dump.display());
    let document = OcrDocument::from_file(dump)
        .map_err(|e| anyhow::anyhow!("Failed to read OCR dump {}: {}", dump.display(), e))?;

    let result = parser.parse(document.header, &document.lines)?;
    print_order_summary(&result.order);

    if let Some(path) = writer.add(&result.order)? {
        println!(
            "{} Output written to {}",
            style("✓").green(),
            path.display()
        );
    }

    Ok(())
}
