//! Subcommands and the options they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod ocr;
pub mod process;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use ordex_core::models::config::{OrdexConfig, Profile, SpreadsheetFormat};
use ordex_core::{Order, SpreadsheetWriter};

/// Extraction profile.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProfileArg {
    /// 8-10 digit codes, per-document spreadsheets with warnings and locations
    Lenient,
    /// Exactly 9 digit codes, missing quantities are errors, one shared spreadsheet
    Strict,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Lenient => Profile::Lenient,
            ProfileArg::Strict => Profile::Strict,
        }
    }
}

/// Spreadsheet format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Excel workbook
    Xlsx,
    /// Comma-separated values
    Csv,
}

impl From<FormatArg> for SpreadsheetFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => SpreadsheetFormat::Xlsx,
            FormatArg::Csv => SpreadsheetFormat::Csv,
        }
    }
}

/// Options overriding the configured extraction and output settings.
#[derive(Args, Debug)]
pub struct OutputOptions {
    /// Extraction profile
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Spreadsheet format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep non-canonical filenames instead of renaming them
    #[arg(long)]
    no_rename: bool,
}

impl OutputOptions {
    /// Apply the command-line overrides to a configuration.
    pub fn apply(&self, config: &mut OrdexConfig) {
        if let Some(profile) = self.profile {
            config.apply_profile(profile.into());
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if self.no_rename {
            config.input.rename = false;
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordex")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<OrdexConfig> {
    if let Some(path) = config_path {
        return Ok(OrdexConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(OrdexConfig::from_file(&default_path)?)
    } else {
        Ok(OrdexConfig::default())
    }
}

/// A spinner with an elapsed-time prefix.
pub fn spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Write the shared spreadsheet and report where it went.
pub fn finish_output(writer: SpreadsheetWriter) -> anyhow::Result<()> {
    if let Some(path) = writer.finish()? {
        println!(
            "{} Shared output written to {}",
            style("✓").green(),
            path.display()
        );
    }
    Ok(())
}

/// Keep the orders finished so far, then return the error that stopped the run.
pub fn abort_with(writer: SpreadsheetWriter, err: anyhow::Error) -> anyhow::Error {
    if let Err(write_err) = finish_output(writer) {
        warn!("Failed to write partial output: {}", write_err);
    }
    err
}

/// Print one line per extracted order.
pub fn print_order_summary(order: &Order) {
    let rif = order
        .order_rif
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} Order {} ({}), rif {}: {} items",
        style("✓").green(),
        order.order_number,
        order.order_date,
        rif,
        order.details.len()
    );
    for warning in &order.warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }
    let flagged = order.details.iter().filter(|d| d.digit_warning).count();
    if flagged > 0 {
        println!(
            "  {} {} item codes with unexpected length",
            style("⚠").yellow(),
            flagged
        );
    }
}
