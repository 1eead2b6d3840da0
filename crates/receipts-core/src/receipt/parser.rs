//! Receipt parser: image path in, product/price records out.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ReceiptError, Result};
use crate::models::config::ReceiptsConfig;
use crate::models::receipt::ProductPrice;
use crate::ocr::DetectionSource;

use super::extractor::{ReceiptExtraction, RecordExtractor};

/// Runs a detection source over a receipt image and extracts its records.
pub struct ReceiptParser<S: DetectionSource> {
    source: S,
    extractor: RecordExtractor,
}

impl<S: DetectionSource> ReceiptParser<S> {
    /// Create a parser with default extraction settings.
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: RecordExtractor::new(),
        }
    }

    /// Create a parser from configuration, validating it first.
    pub fn from_config(source: S, config: &ReceiptsConfig) -> Result<Self> {
        Ok(Self {
            source,
            extractor: RecordExtractor::from_config(config)?,
        })
    }

    /// Replace the record extractor.
    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    /// Extract `(product, price)` records from the receipt image at `image_path`.
    pub fn process_receipt(&self, image_path: impl AsRef<Path>) -> Result<Vec<ProductPrice>> {
        self.parse_receipt(image_path).map(|r| r.items)
    }

    /// Like [`process_receipt`](Self::process_receipt), with line statistics.
    pub fn parse_receipt(&self, image_path: impl AsRef<Path>) -> Result<ReceiptExtraction> {
        let image_path = image_path.as_ref();
        let start = Instant::now();

        // Bad configuration fails before any I/O.
        crate::models::config::validate_line_spacing(self.extractor.max_line_spacing())?;
        check_readable(image_path)?;

        info!("Processing receipt: {}", image_path.display());

        let detections = self.source.detect(image_path)?;
        debug!("Detection source returned {} detections", detections.len());

        let mut result = self.extractor.parse(detections)?;
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {} records from {} lines in {}ms",
            result.items.len(),
            result.line_count,
            result.processing_time_ms
        );

        Ok(result)
    }
}

/// Fail with `FileAccess` unless `path` is a regular file we can open.
fn check_readable(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| ReceiptError::file_access(path, e))?;
    if !metadata.is_file() {
        return Err(ReceiptError::file_access(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    std::fs::File::open(path).map_err(|e| ReceiptError::file_access(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{Detection, StaticDetections};
    use pretty_assertions::assert_eq;

    fn milk_and_bread() -> StaticDetections {
        StaticDetections::new(vec![
            Detection::from_rect("Milk", 10.0, 10.0, 60.0, 22.0),
            Detection::from_rect("2.50", 200.0, 11.0, 240.0, 23.0),
            Detection::from_rect("Bread", 10.0, 40.0, 60.0, 52.0),
        ])
    }

    #[test]
    fn test_process_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("receipt.jpg");
        std::fs::write(&image, b"not really a jpeg").unwrap();

        let parser = ReceiptParser::new(milk_and_bread());
        assert_eq!(
            parser.process_receipt(&image).unwrap(),
            vec![ProductPrice::new("Milk", "2.50")]
        );
    }

    #[test]
    fn test_missing_image_is_not_found() {
        let parser = ReceiptParser::new(milk_and_bread());
        let err = parser
            .process_receipt("/nonexistent/non-existent-file.jpg")
            .unwrap_err();
        assert!(err.is_not_found(), "{:?}", err);
    }

    #[test]
    fn test_directory_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let parser = ReceiptParser::new(milk_and_bread());
        let err = parser.process_receipt(dir.path()).unwrap_err();
        assert!(matches!(err, ReceiptError::FileAccess { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_invalid_spacing_fails_before_file_check() {
        let parser = ReceiptParser::new(milk_and_bread())
            .with_extractor(RecordExtractor::new().with_max_line_spacing(-3.0));
        let err = parser.process_receipt("/nonexistent/receipt.jpg").unwrap_err();
        assert!(matches!(err, ReceiptError::InvalidArgument(_)));
    }

    #[test]
    fn test_from_config_rejects_invalid_spacing() {
        let mut config = ReceiptsConfig::default();
        config.layout.max_line_spacing = f32::NAN;
        assert!(ReceiptParser::from_config(milk_and_bread(), &config).is_err());
    }
}
