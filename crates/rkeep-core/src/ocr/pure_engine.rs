//! Receipt recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::sync::Arc;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::models::config::OcrConfig;

use super::{decode_image, join_in_reading_order, RecognizedLine, TextRecognizer};

/// OCR recognizer loading detection/recognition models from disk.
///
/// Inference runs on tokio's blocking pool so the session driver and the
/// front end keep running while a receipt is recognized.
pub struct PureOcrRecognizer {
    engine: Arc<pure_onnx_ocr::engine::OcrEngine>,
    config: OcrConfig,
}

impl PureOcrRecognizer {
    /// Load models named in `config` from its model directory.
    pub fn from_config(config: OcrConfig) -> Result<Self, RecognitionError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(RecognitionError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| RecognitionError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine: Arc::new(engine),
            config,
        })
    }
}

impl TextRecognizer for PureOcrRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError> {
        let engine = Arc::clone(&self.engine);
        let bytes = image.to_vec();
        let keep_unk = self.config.keep_unk;

        // A dropped session abandons the task; its result is discarded.
        tokio::task::spawn_blocking(move || recognize_blocking(&engine, &bytes, keep_unk))
            .await
            .map_err(|e| RecognitionError::Engine(format!("OCR task failed: {}", e)))?
    }
}

fn recognize_blocking(
    engine: &pure_onnx_ocr::engine::OcrEngine,
    bytes: &[u8],
    keep_unk: bool,
) -> Result<String, RecognitionError> {
    let start = Instant::now();
    let image = decode_image(bytes)?;
    let (width, height) = image.dimensions();

    debug!("Recognizing receipt image: {}x{}", width, height);

    let results = engine
        .run_from_image(&image)
        .map_err(|e| RecognitionError::Engine(format!("pure-onnx-ocr: {}", e)))?;

    let lines: Vec<RecognizedLine> = results
        .iter()
        .map(|r| {
            let (x, y) = top_left(&r.bounding_box);
            let text = if keep_unk {
                r.text.clone()
            } else {
                r.text.replace("[UNK]", " ")
            };
            RecognizedLine { text, x, y }
        })
        .collect();

    info!(
        "OCR complete: {} lines in {}ms",
        lines.len(),
        start.elapsed().as_millis()
    );

    Ok(join_in_reading_order(lines))
}

/// Minimum x/y over the polygon's exterior points.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
