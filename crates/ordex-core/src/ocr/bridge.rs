//! OCR through an external command printing JSON lines.
//!
//! The command is invoked as `<program> [args..] --image <png> --langs <a,b>`
//! and must print a JSON array of `{"text": .., "bbox": [x0, y0, x1, y1]}`
//! objects in reading order. This is how detection/recognition models that
//! live outside this process are plugged in.

use std::process::Command;

use image::DynamicImage;
use serde::Deserialize;
use tracing::debug;

use super::{write_temp_png, OcrService, RecognizedLine};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// OCR engine delegating to an external command.
pub struct BridgeEngine {
    program: String,
    args: Vec<String>,
    languages: String,
}

#[derive(Debug, Deserialize)]
struct BridgeLine {
    text: String,
    bbox: [f32; 4],
}

impl BridgeEngine {
    /// Validate the configured command.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let (program, args) = config
            .bridge_command
            .split_first()
            .ok_or_else(|| OcrError::Init("ocr.bridge_command is empty".to_string()))?;

        debug!("OCR bridge command: {} {:?}", program, args);

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            languages: config.languages.join(","),
        })
    }
}

impl OcrService for BridgeEngine {
    fn name(&self) -> &str {
        "bridge"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RecognizedLine>, OcrError> {
        let page_file = write_temp_png(image)?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--image")
            .arg(page_file.path())
            .arg("--langs")
            .arg(&self.languages)
            .output()
            .map_err(|e| OcrError::Engine(format!("failed to invoke {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "{} failed: {}",
                self.program,
                stderr.trim()
            )));
        }

        parse_output(&output.stdout)
    }
}

fn parse_output(stdout: &[u8]) -> Result<Vec<RecognizedLine>, OcrError> {
    let lines: Vec<BridgeLine> = serde_json::from_slice(stdout)
        .map_err(|e| OcrError::Output(format!("bridge JSON: {}", e)))?;

    Ok(lines
        .into_iter()
        .map(|line| RecognizedLine {
            text: line.text,
            bbox: line.bbox,
        })
        .collect())
}
