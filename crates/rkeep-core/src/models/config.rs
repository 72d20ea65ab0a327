//! Configuration structures for receipt extraction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::receipt::TotalExtractor;

/// Main configuration for rkeep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RkeepConfig {
    /// Total-amount extraction rules.
    pub extraction: ExtractionConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,
}

/// Keyword, currency and tip-window policy for total extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keywords that label the payable total. Always preferred.
    pub primary_keywords: Vec<String>,

    /// Fallback keywords, used only when no primary keyword matched.
    pub secondary_keywords: Vec<String>,

    /// Keywords marking a tip/gratuity line.
    pub tip_keywords: Vec<String>,

    /// Currency prefixes allowed between a keyword and its number.
    pub currency_symbols: Vec<String>,

    /// Characters inspected on each side of a numeric token for tip language.
    pub tip_window_chars: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            primary_keywords: strings(&["Total", "TOTAL", "total"]),
            secondary_keywords: strings(&[
                "Subtotal",
                "SUBTOTAL",
                "subtotal",
                "Balance due",
                "Balance Due",
                "BALANCE DUE",
            ]),
            tip_keywords: strings(&[
                "Tip",
                "TIP",
                "tip",
                "Suggested Gratuity",
                "SUGGESTED GRATUITY",
                "suggested gratuity",
            ]),
            currency_symbols: strings(&["$", "CAD$", "CA$", "CA"]),
            tip_window_chars: 100,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
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

    /// Keep `[UNK]` markers emitted for unknown glyphs instead of blanking them.
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

impl RkeepConfig {
    /// Load configuration from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&std::path::Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Ok(Self::from_file(path)?),
            None => Ok(Self::default()),
        }
    }

    /// Compile the extraction rules into an extractor.
    pub fn build_extractor(&self) -> crate::Result<TotalExtractor> {
        Ok(TotalExtractor::from_config(&self.extraction)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
