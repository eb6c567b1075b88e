//! OCR through the `tesseract` executable.
//!
//! Tesseract's TSV output lists words with their block, paragraph and line
//! numbers. Words sharing those numbers are joined into one line whose box
//! is the union of the word boxes.

use std::path::PathBuf;
use std::process::Command;

use image::DynamicImage;
use serde::Deserialize;
use tracing::{debug, trace};

use super::{write_temp_png, OcrService, RecognizedLine};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// TSV level of a single word.
const WORD_LEVEL: u8 = 5;

/// OCR engine running the tesseract CLI once per page.
pub struct TesseractEngine {
    program: PathBuf,
    languages: String,
    page_segmentation_mode: u8,
}

impl TesseractEngine {
    /// Check that tesseract runs and remember the invocation settings.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let output = Command::new(&config.tesseract_path)
            .arg("--version")
            .output()
            .map_err(|e| {
                OcrError::Init(format!(
                    "cannot run {}: {}",
                    config.tesseract_path.display(),
                    e
                ))
            })?;
        if !output.status.success() {
            return Err(OcrError::Init(format!(
                "{} --version exited with {}",
                config.tesseract_path.display(),
                output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        debug!("Using {}", version.lines().next().unwrap_or("tesseract"));

        Ok(Self {
            program: config.tesseract_path.clone(),
            languages: config.languages.join("+"),
            page_segmentation_mode: config.page_segmentation_mode,
        })
    }
}

impl OcrService for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RecognizedLine>, OcrError> {
        let page_file = write_temp_png(image)?;

        let output = Command::new(&self.program)
            .arg(page_file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .arg("tsv")
            .output()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!("tesseract failed: {}", stderr.trim())));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct TsvRow {
    level: u8,
    page_num: u32,
    block_num: u32,
    par_num: u32,
    line_num: u32,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    #[serde(default)]
    text: String,
}

impl TsvRow {
    fn line_key(&self) -> (u32, u32, u32, u32) {
        (self.page_num, self.block_num, self.par_num, self.line_num)
    }
}

/// Group TSV words into lines, in order of first appearance.
fn parse_tsv(tsv: &str) -> Result<Vec<RecognizedLine>, OcrError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(tsv.as_bytes());

    let mut lines: Vec<RecognizedLine> = Vec::new();
    let mut current_key = None;

    for row in reader.deserialize::<TsvRow>() {
        let row = row.map_err(|e| OcrError::Output(format!("tesseract TSV: {}", e)))?;
        let word = row.text.trim();
        if row.level != WORD_LEVEL || word.is_empty() {
            continue;
        }

        let bbox = [row.left, row.top, row.left + row.width, row.top + row.height];
        let key = row.line_key();

        if current_key == Some(key) {
            if let Some(line) = lines.last_mut() {
                line.text.push(' ');
                line.text.push_str(word);
                line.bbox = union(line.bbox, bbox);
                continue;
            }
        }

        trace!("New line {:?} starting with '{}'", key, word);
        lines.push(RecognizedLine {
            text: word.to_string(),
            bbox,
        });
        current_key = Some(key);
    }

    Ok(lines)
}

fn union(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_words_grouped_into_lines() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1000\t1400\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t100\t200\t12\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t100\t40\t10\t96.2\tRIF.",
            "5\t1\t1\t1\t1\t2\t60\t98\t80\t12\t91.0\t4521.99",
            "5\t1\t2\t1\t1\t1\t300\t100\t50\t11\t88.5\t50,000",
        ]);

        let lines = parse_tsv(&input).unwrap();
        assert_eq!(
            lines,
            vec![
                RecognizedLine {
                    text: "RIF. 4521.99".to_string(),
                    bbox: [10.0, 98.0, 140.0, 110.0],
                },
                RecognizedLine {
                    text: "50,000".to_string(),
                    bbox: [300.0, 100.0, 350.0, 111.0],
                },
            ]
        );
    }

    #[test]
    fn test_blank_words_are_skipped() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t100\t40\t10\t-1\t ",
            "5\t1\t1\t1\t2\t1\t10\t120\t40\t10\t90\t123.456.789",
        ]);
        let lines = parse_tsv(&input).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "123.456.789");
    }

    #[test]
    fn test_quotes_are_literal() {
        let input = tsv(&["5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\t\"UFFICIO"]);
        let lines = parse_tsv(&input).unwrap();
        assert_eq!(lines[0].text, "\"UFFICIO");
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_tsv(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_missing_binary_fails_init() {
        let config = OcrConfig {
            tesseract_path: PathBuf::from("/nonexistent/ordex-tesseract"),
            ..OcrConfig::default()
        };
        assert!(matches!(TesseractEngine::new(&config), Err(OcrError::Init(_))));
    }
}
