//! PaddleOCR result adapter.
//!
//! PaddleOCR returns one entry per page, each a list of
//! `[box, [text, confidence]]` where `box` is four `[x, y]` points. A page
//! with no text comes back as `null`.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{ReceiptError, Result};

use super::{Detection, DetectionSource};

/// Flatten a PaddleOCR result into detections, page by page.
pub fn parse_paddle_result(result: &Value) -> Result<Vec<Detection>> {
    let pages = expect_array(result, "result")?;
    let mut detections = Vec::new();

    for (page_idx, page) in pages.iter().enumerate() {
        if page.is_null() {
            continue;
        }
        let location = format!("result[{}]", page_idx);
        for (det_idx, item) in expect_array(page, &location)?.iter().enumerate() {
            let location = format!("result[{}][{}]", page_idx, det_idx);
            detections.push(parse_detection(item, &location)?);
        }
    }

    debug!("Flattened {} detections from {} pages", detections.len(), pages.len());
    Ok(detections)
}

fn parse_detection(item: &Value, location: &str) -> Result<Detection> {
    let fields = expect_array(item, location)?;
    if fields.len() != 2 {
        return Err(malformed(location, "expected [box, [text, confidence]]"));
    }

    let points = expect_array(&fields[0], &format!("{}[0]", location))?;
    if points.len() != 4 {
        return Err(malformed(
            &format!("{}[0]", location),
            &format!("expected 4 corner points, found {}", points.len()),
        ));
    }

    let mut bbox = [0.0f32; 8];
    for (i, point) in points.iter().enumerate() {
        let point_location = format!("{}[0][{}]", location, i);
        let coords = expect_array(point, &point_location)?;
        if coords.len() != 2 {
            return Err(malformed(&point_location, "expected an [x, y] pair"));
        }
        bbox[i * 2] = expect_number(&coords[0], &format!("{}[0]", point_location))?;
        bbox[i * 2 + 1] = expect_number(&coords[1], &format!("{}[1]", point_location))?;
    }

    let recognized_location = format!("{}[1]", location);
    let recognized = expect_array(&fields[1], &recognized_location)?;
    let text = recognized
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(&format!("{}[0]", recognized_location), "expected text"))?;
    let confidence = match recognized.get(1) {
        Some(value) => expect_number(value, &format!("{}[1]", recognized_location))?,
        None => 1.0,
    };

    Ok(Detection {
        text: text.to_string(),
        bbox,
        confidence,
    })
}

fn expect_array<'a>(value: &'a Value, location: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| malformed(location, &format!("expected an array, found {}", kind(value))))
}

fn expect_number(value: &Value, location: &str) -> Result<f32> {
    value
        .as_f64()
        .map(|n| n as f32)
        .ok_or_else(|| malformed(location, &format!("expected a number, found {}", kind(value))))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn malformed(location: &str, reason: &str) -> ReceiptError {
    ReceiptError::MalformedInput(format!("{}: {}", location, reason))
}

/// Replays PaddleOCR results saved as JSON.
#[derive(Debug, Clone)]
pub struct RecordedDetections {
    dump: Option<PathBuf>,
}

impl RecordedDetections {
    /// Always replay the dump at `path`, whatever image is requested.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            dump: Some(path.into()),
        }
    }

    /// Replay `<image stem>.ocr.json` next to each requested image.
    pub fn sidecar() -> Self {
        Self { dump: None }
    }

    fn dump_path(&self, image_path: &Path) -> PathBuf {
        match &self.dump {
            Some(path) => path.clone(),
            None => image_path.with_extension("ocr.json"),
        }
    }
}

impl DetectionSource for RecordedDetections {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let path = self.dump_path(image_path);
        debug!("Replaying OCR result from {}", path.display());

        let content =
            std::fs::read_to_string(&path).map_err(|e| ReceiptError::file_access(&path, e))?;
        let result: Value = serde_json::from_str(&content).map_err(|e| {
            ReceiptError::MalformedInput(format!("{}: {}", path.display(), e))
        })?;
        parse_paddle_result(&result)
    }
}
