//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ReceiptError, Result};

/// Default vertical tolerance (in pixels) between a line's anchor and its members.
pub const DEFAULT_MAX_LINE_SPACING: f32 = 10.0;

/// Main configuration for the receipts pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptsConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Line reconstruction configuration.
    pub layout: LayoutConfig,

    /// Product/price extraction configuration.
    pub extraction: ExtractionConfig,
}

/// OCR engine configuration (`pure-onnx-ocr` model files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep the recognizer's `[UNK]` marker instead of replacing it with a space.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Line reconstruction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum vertical distance from a line's anchor token (must be >= 0).
    pub max_line_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_line_spacing: DEFAULT_MAX_LINE_SPACING,
        }
    }
}

/// Which price candidate on a line is taken as the line's price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSelection {
    /// The physically rightmost candidate, whatever its format.
    #[default]
    Rightmost,
    /// The rightmost candidate with cents, falling back to the rightmost candidate.
    RightmostDecimal,
}

/// How bare integers (`"12"`) are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BareIntegerPolicy {
    /// Bare integers are price candidates like any other.
    #[default]
    Always,
    /// Bare integers are never price-like and stay in the product text.
    Never,
    /// Bare integers are price-like, but only selected when no decimal price is on the line.
    WhenNoDecimal,
}

/// Product/price extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Candidate selection policy.
    pub price_selection: PriceSelection,

    /// Bare integer handling.
    pub bare_integers: BareIntegerPolicy,
}

impl ReceiptsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReceiptError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ReceiptError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| ReceiptError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Check value contracts.
    pub fn validate(&self) -> Result<()> {
        validate_line_spacing(self.layout.max_line_spacing)
    }
}

/// Reject negative or NaN spacing thresholds.
pub(crate) fn validate_line_spacing(max_line_spacing: f32) -> Result<()> {
    if max_line_spacing.is_nan() || max_line_spacing < 0.0 {
        return Err(ReceiptError::InvalidArgument(format!(
            "max_line_spacing must be >= 0, got {}",
            max_line_spacing
        )));
    }
    Ok(())
}
