//! Configuration structures for the order extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::OrdexError;

/// Main configuration for the ordex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdexConfig {
    /// Input discovery configuration.
    pub input: InputConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Order extraction configuration.
    pub extraction: ExtractionConfig,

    /// Spreadsheet output configuration.
    pub output: OutputConfig,
}

/// Named bundles of extraction and output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// 8-10 digit codes, tolerant quantity matching, per-document output.
    Lenient,
    /// Exactly 9 digit codes, missing quantities are fatal, one shared output.
    Strict,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Lenient => write!(f, "lenient"),
            Profile::Strict => write!(f, "strict"),
        }
    }
}

/// Input discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for order documents.
    pub directory: PathBuf,

    /// Glob pattern matched inside `directory`.
    pub pattern: String,

    /// Rename non-canonical filenames on disk.
    pub rename: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            pattern: "*.pdf".to_string(),
            rename: true,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { max_pages: 0 }
    }
}

/// Which OCR engine backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// The `tesseract` executable with TSV output.
    Tesseract,
    /// An external command printing JSON text lines.
    Bridge,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine backend.
    pub backend: OcrBackendKind,

    /// Recognition languages passed to the engine.
    pub languages: Vec<String>,

    /// Path or name of the tesseract executable.
    pub tesseract_path: PathBuf,

    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u8,

    /// Program and leading arguments of the bridge command.
    pub bridge_command: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::Tesseract,
            languages: vec!["ita".to_string()],
            tesseract_path: PathBuf::from("tesseract"),
            // Sparse text keeps table cells as separate lines.
            page_segmentation_mode: 11,
            bridge_command: Vec::new(),
        }
    }
}

/// How the quantity is read from a matched quantity text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityParse {
    /// Integer before the first comma ("50,000" -> 50).
    BeforeComma,
    /// First character only ("5,000" -> 5).
    FirstChar,
}

/// What happens when no quantity can be associated with an item code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingQuantity {
    /// Log a warning and leave the quantity empty.
    Warn,
    /// Fail the document.
    Fail,
}

/// A location phrase and the suffix it contributes to the `rif` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRule {
    /// Lowercase phrase searched for in OCR lines.
    pub phrase: String,
    /// Abbreviation appended to the reference, e.g. `-UFF.A`.
    pub label: String,
}

impl LocationRule {
    pub fn new(phrase: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            label: label.into(),
        }
    }
}

/// Order extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Case-insensitive marker of the reference line.
    pub reference_marker: String,

    /// Shortest accepted item code.
    pub item_code_min_len: usize,

    /// Longest accepted item code.
    pub item_code_max_len: usize,

    /// Item code length that does not raise a digit warning.
    pub expected_item_code_len: usize,

    /// Report codes whose length differs from `expected_item_code_len`.
    pub flag_digit_count: bool,

    /// Number of digit-bearing tokens joined into one item code.
    pub max_code_tokens: usize,

    /// Substrings that disqualify an item code candidate.
    pub excluded_patterns: Vec<String>,

    /// Shortest accepted quantity text (trimmed).
    pub quantity_min_len: usize,

    /// Longest accepted quantity text (trimmed).
    pub quantity_max_len: usize,

    /// How the quantity integer is read.
    pub quantity_parse: QuantityParse,

    /// Policy for item codes without a quantity.
    pub missing_quantity: MissingQuantity,

    /// Enable location tagging.
    pub locations_enabled: bool,

    /// Ordered location phrases.
    pub locations: Vec<LocationRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ExtractionConfig {
    /// Tolerant settings: 8-10 digit codes flagged when not 9 long.
    pub fn lenient() -> Self {
        Self {
            reference_marker: "rif".to_string(),
            item_code_min_len: 8,
            item_code_max_len: 10,
            expected_item_code_len: 9,
            flag_digit_count: true,
            max_code_tokens: 3,
            excluded_patterns: ["/", ",", "-", "MM"].iter().map(|s| s.to_string()).collect(),
            quantity_min_len: 5,
            quantity_max_len: 7,
            quantity_parse: QuantityParse::BeforeComma,
            missing_quantity: MissingQuantity::Warn,
            locations_enabled: true,
            locations: default_locations(),
        }
    }

    /// Exact settings: 9 digit codes, 5 character quantities, hard failures.
    pub fn strict() -> Self {
        Self {
            item_code_min_len: 9,
            item_code_max_len: 9,
            flag_digit_count: false,
            quantity_min_len: 5,
            quantity_max_len: 5,
            quantity_parse: QuantityParse::FirstChar,
            missing_quantity: MissingQuantity::Fail,
            locations_enabled: false,
            ..Self::lenient()
        }
    }
}

fn default_locations() -> Vec<LocationRule> {
    vec![
        LocationRule::new("ufficio a", "-UFF.A"),
        LocationRule::new("ufficio b", "-UFF.B"),
        LocationRule::new("ufficio c/d", "-UFF.C/D"),
        LocationRule::new("sala riunioni h", "-S.R.H"),
    ]
}

/// Spreadsheet file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadsheetFormat {
    Xlsx,
    Csv,
}

impl SpreadsheetFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => "xlsx",
            SpreadsheetFormat::Csv => "csv",
        }
    }
}

/// Whether each document gets its own spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// One spreadsheet named after each document.
    PerDocument,
    /// One spreadsheet with the rows of every document in the run.
    Shared,
}

/// Spreadsheet output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving spreadsheets.
    pub directory: PathBuf,

    /// Spreadsheet format.
    pub format: SpreadsheetFormat,

    /// Per-document or shared output.
    pub mode: OutputMode,

    /// File stem of the shared spreadsheet.
    pub shared_name: String,

    /// Emit the `digit_warning` column.
    pub include_digit_warning: bool,

    /// Append location labels to the `rif` column.
    pub include_location: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::lenient()
    }
}

impl OutputConfig {
    pub fn lenient() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: SpreadsheetFormat::Xlsx,
            mode: OutputMode::PerDocument,
            shared_name: "orders".to_string(),
            include_digit_warning: true,
            include_location: true,
        }
    }

    pub fn strict() -> Self {
        Self {
            mode: OutputMode::Shared,
            include_digit_warning: false,
            include_location: false,
            ..Self::lenient()
        }
    }
}

impl OrdexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            OrdexError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| OrdexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace extraction and output policy with a named profile.
    ///
    /// Directories, format and location phrases are kept.
    pub fn apply_profile(&mut self, profile: Profile) {
        let (mut extraction, mut output) = match profile {
            Profile::Lenient => (ExtractionConfig::lenient(), OutputConfig::lenient()),
            Profile::Strict => (ExtractionConfig::strict(), OutputConfig::strict()),
        };
        extraction.reference_marker = std::mem::take(&mut self.extraction.reference_marker);
        extraction.locations = std::mem::take(&mut self.extraction.locations);
        output.directory = std::mem::take(&mut self.output.directory);
        output.format = self.output.format;
        output.shared_name = std::mem::take(&mut self.output.shared_name);
        self.extraction = extraction;
        self.output = output;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_lenient() {
        let config = OrdexConfig::default();
        assert_eq!(config.extraction.item_code_min_len, 8);
        assert_eq!(config.extraction.item_code_max_len, 10);
        assert_eq!(config.extraction.missing_quantity, MissingQuantity::Warn);
        assert_eq!(config.output.mode, OutputMode::PerDocument);
        assert_eq!(config.extraction.locations.len(), 4);
    }

    #[test]
    fn test_apply_strict_profile_keeps_paths() {
        let mut config = OrdexConfig::default();
        config.output.directory = PathBuf::from("out");
        config.output.format = SpreadsheetFormat::Csv;
        config.apply_profile(Profile::Strict);

        assert_eq!(config.extraction.item_code_min_len, 9);
        assert_eq!(config.extraction.quantity_parse, QuantityParse::FirstChar);
        assert!(!config.extraction.locations_enabled);
        assert_eq!(config.output.mode, OutputMode::Shared);
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.output.format, SpreadsheetFormat::Csv);
        assert_eq!(config.extraction.reference_marker, "rif");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: OrdexConfig =
            serde_json::from_str(r#"{"ocr": {"backend": "bridge"}}"#).unwrap();
        assert_eq!(config.ocr.backend, OcrBackendKind::Bridge);
        assert_eq!(config.ocr.languages, vec!["ita".to_string()]);
        assert_eq!(config.input.pattern, "*.pdf");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = OrdexConfig::default();
        config.extraction.locations.push(LocationRule::new("magazzino", "-MAG"));
        config.save(&path).unwrap();

        let loaded = OrdexConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.locations, config.extraction.locations);
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction": {"item_code_min_len": "nine"}}"#).unwrap();

        let err = OrdexConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, OrdexError::Config(_)));

        let missing = OrdexConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, OrdexError::Io(_)));
    }
}
