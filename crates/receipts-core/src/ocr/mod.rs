//! OCR collaborator boundary.
//!
//! The OCR engine is consumed, not implemented: every engine is wrapped in a
//! [`DetectionSource`] that turns a receipt image into an unordered list of
//! [`Detection`]s. Nothing downstream sees an engine's native result shape.

pub mod paddle;
#[cfg(feature = "native")]
mod pure_engine;

pub use paddle::{parse_paddle_result, RecordedDetections};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One recognized text fragment with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Recognized text content.
    pub text: String,

    /// Bounding box corners (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognition confidence score (0.0 - 1.0). Not used for extraction.
    pub confidence: f32,
}

impl Detection {
    /// Create a detection from four `(x, y)` corners.
    pub fn new(text: impl Into<String>, corners: [(f32, f32); 4]) -> Self {
        let mut bbox = [0.0f32; 8];
        for (i, (x, y)) in corners.into_iter().enumerate() {
            bbox[i * 2] = x;
            bbox[i * 2 + 1] = y;
        }
        Self {
            text: text.into(),
            bbox,
            confidence: 1.0,
        }
    }

    /// Axis-aligned box helper, mostly for tests and fixtures.
    pub fn from_rect(text: impl Into<String>, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(text, [(x1, y1), (x2, y1), (x2, y2), (x1, y2)])
    }

    /// The four corners as `(x, y)` pairs.
    pub fn corners(&self) -> [(f32, f32); 4] {
        corners(&self.bbox)
    }

    /// Smallest y over the corners.
    pub fn top_y(&self) -> f32 {
        top_y(&self.bbox)
    }

    /// Smallest x over the corners.
    pub fn left_x(&self) -> f32 {
        left_x(&self.bbox)
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let corners = self.corners();
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

pub(crate) fn corners(bbox: &[f32; 8]) -> [(f32, f32); 4] {
    [
        (bbox[0], bbox[1]),
        (bbox[2], bbox[3]),
        (bbox[4], bbox[5]),
        (bbox[6], bbox[7]),
    ]
}

// `f32::min` ignores NaN, so a NaN corner only surfaces when every corner is NaN.
// Use a plain comparison fold instead so any NaN poisons the key.
fn min_of(values: [f32; 4]) -> f32 {
    values
        .into_iter()
        .reduce(|a, b| if a.is_nan() || b.is_nan() { f32::NAN } else { a.min(b) })
        .unwrap_or(f32::NAN)
}

pub(crate) fn top_y(bbox: &[f32; 8]) -> f32 {
    min_of([bbox[1], bbox[3], bbox[5], bbox[7]])
}

pub(crate) fn left_x(bbox: &[f32; 8]) -> f32 {
    min_of([bbox[0], bbox[2], bbox[4], bbox[6]])
}

/// Produces detections for a receipt image.
pub trait DetectionSource {
    /// Run OCR on the image at `image_path`.
    ///
    /// The returned detections carry no ordering guarantee.
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>>;
}

impl<S: DetectionSource + ?Sized> DetectionSource for &S {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        (**self).detect(image_path)
    }
}

impl<S: DetectionSource + ?Sized> DetectionSource for Box<S> {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        (**self).detect(image_path)
    }
}

/// Returns a fixed set of detections regardless of the image.
#[derive(Debug, Clone, Default)]
pub struct StaticDetections {
    detections: Vec<Detection>,
}

impl StaticDetections {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl DetectionSource for StaticDetections {
    fn detect(&self, _image_path: &Path) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_and_left_use_minimum_corner() {
        // Slightly rotated box: the top-left corner is not the first point.
        let det = Detection::new("TOTAL", [(12.0, 30.0), (80.0, 28.5), (81.0, 40.0), (11.5, 41.0)]);
        assert_eq!(det.top_y(), 28.5);
        assert_eq!(det.left_x(), 11.5);
        assert_eq!(det.rect(), (11.5, 28.5, 81.0, 41.0));
    }

    #[test]
    fn test_nan_corner_poisons_key() {
        let det = Detection::new("x", [(0.0, 1.0), (1.0, f32::NAN), (1.0, 2.0), (0.0, 2.0)]);
        assert!(det.top_y().is_nan());
        assert_eq!(det.left_x(), 0.0);
    }

    #[test]
    fn test_static_source_ignores_path() {
        let source =
            StaticDetections::new(vec![Detection::from_rect("Milk", 0.0, 10.0, 40.0, 20.0)]);
        let detections = source.detect(Path::new("whatever.jpg")).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "Milk");
    }
}
