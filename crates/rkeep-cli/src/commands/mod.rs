//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod scan;

use std::path::{Path, PathBuf};

use tracing::debug;

use rkeep_core::models::config::RkeepConfig;
use rkeep_core::{PlainTextRecognizer, PureOcrRecognizer, RecognitionError, TextRecognizer};

/// Extensions read as already-recognized receipt text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

/// Extensions sent through OCR.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp", "heic"];

/// Load configuration from `--config`, the default location, or built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RkeepConfig> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => Some(config::default_config_path()).filter(|p| p.exists()),
    };

    if let Some(path) = &path {
        debug!("Loading configuration from {}", path.display());
    }

    Ok(RkeepConfig::load(path.as_deref())?)
}

/// Whether `path` has an extension the CLI knows how to read.
pub fn is_supported(path: &Path) -> bool {
    let ext = extension(path);
    TEXT_EXTENSIONS.contains(&ext.as_str()) || IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Recognizer picked from the input file type.
pub enum InputRecognizer {
    Text(PlainTextRecognizer),
    Ocr(Box<PureOcrRecognizer>),
}

impl InputRecognizer {
    /// Text files need no models; images load the OCR engine.
    pub fn for_input(
        path: &Path,
        config: &RkeepConfig,
        model_dir: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let ext = extension(path);

        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(Self::Text(PlainTextRecognizer));
        }

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            let mut ocr = config.ocr.clone();
            if let Some(dir) = model_dir {
                ocr.model_dir = dir.to_path_buf();
            }
            let recognizer = PureOcrRecognizer::from_config(ocr)
                .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
            return Ok(Self::Ocr(Box::new(recognizer)));
        }

        anyhow::bail!("Unsupported file format: {}", ext)
    }
}

impl TextRecognizer for InputRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError> {
        match self {
            Self::Text(recognizer) => recognizer.recognize(image).await,
            Self::Ocr(recognizer) => recognizer.recognize(image).await,
        }
    }
}
