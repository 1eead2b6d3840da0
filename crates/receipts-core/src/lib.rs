//! Core library for receipt OCR processing.
//!
//! This crate provides:
//! - An OCR boundary (`DetectionSource`) with a `pure-onnx-ocr` engine and a
//!   PaddleOCR result adapter
//! - Visual line reconstruction from unordered text boxes
//! - Price-like token classification
//! - Ordered `(product, price)` record extraction

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use error::{OcrError, ReceiptError, Result};
pub use models::config::{
    BareIntegerPolicy, PriceSelection, ReceiptsConfig, DEFAULT_MAX_LINE_SPACING,
};
pub use models::receipt::{records_from_json, records_to_json, ProductPrice};
pub use ocr::{
    parse_paddle_result, Detection, DetectionSource, RecordedDetections, StaticDetections,
};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use receipt::{
    group_into_lines, is_price, is_price_value, PositionedToken, PriceClassifier, PriceRule,
    ReceiptExtraction, ReceiptParser, RecordExtractor, VisualLine,
};
