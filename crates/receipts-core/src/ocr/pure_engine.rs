//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info};

use crate::error::{OcrError, ReceiptError, Result};
use crate::models::config::OcrConfig;

use super::{Detection, DetectionSource};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `config`.
    pub fn from_config(config: OcrConfig) -> Result<Self> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.is_file() {
                return Err(
                    OcrError::ModelLoad(format!("missing model file {}", path.display())).into(),
                );
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Create an engine with default file names from `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        Self::from_config(OcrConfig {
            model_dir: model_dir.to_path_buf(),
            ..OcrConfig::default()
        })
    }
}

impl DetectionSource for PureOcrEngine {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let start = Instant::now();

        let image = image::open(image_path).map_err(|e| match e {
            image::ImageError::IoError(io) => ReceiptError::file_access(image_path, io),
            other => ReceiptError::Ocr(other.into()),
        })?;
        let (width, height) = image.dimensions();

        info!("Running OCR on {} ({}x{})", image_path.display(), width, height);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::Detection(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let detections: Vec<Detection> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Detection {
                    text,
                    bbox: polygon_to_bbox(&r.bounding_box),
                    confidence: r.confidence,
                }
            })
            .collect();

        debug!(
            "OCR produced {} detections in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Takes the first 4 exterior points (quadrilateral). A polygon with fewer
/// points repeats its last point so the box stays closed.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    let mut last = (0.0f32, 0.0f32);
    let mut coords = polygon.exterior().coords();
    for i in 0..4 {
        if let Some(coord) = coords.next() {
            last = (coord.x as f32, coord.y as f32);
        }
        bbox[i * 2] = last.0;
        bbox[i * 2 + 1] = last.1;
    }
    bbox
}
