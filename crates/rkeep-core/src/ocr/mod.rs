//! Image-to-text collaborators.
//!
//! The extraction core only needs one block of text per receipt photo. Any
//! recognizer that turns encoded image bytes into newline-separated lines
//! can drive the workflow.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;

use std::future::Future;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RecognitionError;

/// Vertical band (pixels) within which lines count as the same row.
const ROW_HEIGHT: f32 = 20.0;

/// Converts an encoded image into receipt text.
pub trait TextRecognizer {
    /// Recognize all text lines in `image`, top candidate only, joined by `\n`.
    fn recognize(&self, image: &[u8]) -> impl Future<Output = Result<String, RecognitionError>>;
}

/// Recognizer for input that is already text (pre-scanned receipts, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRecognizer;

impl TextRecognizer for PlainTextRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError> {
        let text = std::str::from_utf8(image)
            .map_err(|e| RecognitionError::Decode(format!("input is not UTF-8 text: {}", e)))?;
        Ok(text.replace("\r\n", "\n"))
    }
}

/// Decode encoded image bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, RecognitionError> {
    if bytes.is_empty() {
        return Err(RecognitionError::Decode("empty image".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| RecognitionError::Decode(e.to_string()))
}

/// One recognized line with the top-left corner of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Join lines top-to-bottom, left-to-right.
pub fn join_in_reading_order(mut lines: Vec<RecognizedLine>) -> String {
    lines.sort_by(|a, b| {
        let row_a = (a.y / ROW_HEIGHT) as i32;
        let row_b = (b.y / ROW_HEIGHT) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        }
    });

    debug!("Joining {} recognized lines", lines.len());

    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
