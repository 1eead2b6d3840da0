//! Product/price extraction from detections.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::config::{
    BareIntegerPolicy, ExtractionConfig, PriceSelection, ReceiptsConfig, DEFAULT_MAX_LINE_SPACING,
};
use crate::models::receipt::ProductPrice;
use crate::ocr::Detection;

use super::lines::{group_into_lines, PositionedToken, VisualLine};
use super::price::{PriceClassifier, PriceRule};

/// Outcome of extracting one receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptExtraction {
    /// Extracted records, top to bottom.
    pub items: Vec<ProductPrice>,
    /// Number of visual lines found.
    pub line_count: usize,
    /// Lines that had no price candidate.
    pub lines_without_price: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Turns detections into ordered product/price records.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    classifier: PriceClassifier,
    max_line_spacing: f32,
    price_selection: PriceSelection,
    bare_integers: BareIntegerPolicy,
}

enum LineOutcome {
    NoCandidate,
    NoProduct,
    Record(ProductPrice),
}

impl RecordExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            classifier: PriceClassifier::new(),
            max_line_spacing: DEFAULT_MAX_LINE_SPACING,
            price_selection: PriceSelection::default(),
            bare_integers: BareIntegerPolicy::default(),
        }
    }

    /// Create an extractor from configuration, validating it first.
    pub fn from_config(config: &ReceiptsConfig) -> Result<Self> {
        config.validate()?;
        let ExtractionConfig {
            price_selection,
            bare_integers,
        } = config.extraction;

        Ok(Self::new()
            .with_max_line_spacing(config.layout.max_line_spacing)
            .with_price_selection(price_selection)
            .with_bare_integers(bare_integers))
    }

    /// Set the vertical line tolerance. Checked when extraction runs.
    pub fn with_max_line_spacing(mut self, max_line_spacing: f32) -> Self {
        self.max_line_spacing = max_line_spacing;
        self
    }

    /// Set the candidate selection policy.
    pub fn with_price_selection(mut self, selection: PriceSelection) -> Self {
        self.price_selection = selection;
        self
    }

    /// Set the bare-integer policy.
    pub fn with_bare_integers(mut self, policy: BareIntegerPolicy) -> Self {
        self.classifier = PriceClassifier::for_policy(policy);
        self.bare_integers = policy;
        self
    }

    pub fn max_line_spacing(&self) -> f32 {
        self.max_line_spacing
    }

    pub fn classifier(&self) -> &PriceClassifier {
        &self.classifier
    }

    /// Extract records from unordered detections.
    pub fn extract(&self, detections: Vec<Detection>) -> Result<Vec<ProductPrice>> {
        self.parse(detections).map(|r| r.items)
    }

    /// Extract records and line statistics from unordered detections.
    pub fn parse(&self, detections: Vec<Detection>) -> Result<ReceiptExtraction> {
        let start = Instant::now();

        let tokens: Vec<PositionedToken> =
            detections.into_iter().map(PositionedToken::from).collect();
        let lines = group_into_lines(tokens, self.max_line_spacing)?;
        debug!("Grouped detections into {} lines", lines.len());

        let mut items = Vec::new();
        let mut lines_without_price = 0;

        for (number, line) in lines.iter().enumerate() {
            match self.extract_from_line(number, line) {
                LineOutcome::Record(record) => items.push(record),
                LineOutcome::NoCandidate => lines_without_price += 1,
                LineOutcome::NoProduct => {}
            }
        }

        Ok(ReceiptExtraction {
            items,
            line_count: lines.len(),
            lines_without_price,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// The record a single line yields, if any.
    pub fn extract_line(&self, line: &VisualLine) -> Option<ProductPrice> {
        match self.extract_from_line(0, line) {
            LineOutcome::Record(record) => Some(record),
            LineOutcome::NoCandidate | LineOutcome::NoProduct => None,
        }
    }

    fn extract_from_line(&self, number: usize, line: &VisualLine) -> LineOutcome {
        let texts: Vec<&str> = reading_order(line).iter().map(|t| t.text.as_str()).collect();
        let classes: Vec<Option<PriceRule>> =
            texts.iter().map(|t| self.classifier.classify(t)).collect();
        let candidates: Vec<(usize, PriceRule)> = classes
            .iter()
            .enumerate()
            .filter_map(|(i, class)| class.map(|rule| (i, rule)))
            .collect();

        debug!("Line {}: {:?}", number, texts);
        debug!("Price candidates: {:?}", candidates);

        let Some(price_idx) = self.select_price(&candidates) else {
            return LineOutcome::NoCandidate;
        };

        let product = texts[..price_idx]
            .iter()
            .zip(&classes)
            .filter(|(_, class)| class.is_none())
            .map(|(text, _)| *text)
            .collect::<Vec<_>>()
            .join(" ");
        let product = product.trim();

        if product.is_empty() {
            debug!("Line {}: price {:?} without product text", number, texts[price_idx]);
            return LineOutcome::NoProduct;
        }

        LineOutcome::Record(ProductPrice::new(product, texts[price_idx]))
    }

    /// Index of the chosen price. `candidates` is in ascending index order.
    fn select_price(&self, candidates: &[(usize, PriceRule)]) -> Option<usize> {
        let has_decimal = candidates.iter().any(|(_, rule)| rule.is_decimal());
        let eligible: Vec<&(usize, PriceRule)> = candidates
            .iter()
            .filter(|(_, rule)| {
                rule.is_decimal()
                    || !(self.bare_integers == BareIntegerPolicy::WhenNoDecimal && has_decimal)
            })
            .collect();

        let chosen = match self.price_selection {
            PriceSelection::Rightmost => eligible.last(),
            PriceSelection::RightmostDecimal => eligible
                .iter()
                .rev()
                .find(|(_, rule)| rule.is_decimal())
                .or(eligible.last()),
        };
        chosen.map(|(idx, _)| *idx)
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Line members sorted left to right (stable on equal `left_x`).
fn reading_order(line: &VisualLine) -> Vec<&PositionedToken> {
    let mut ordered: Vec<&PositionedToken> = line.tokens().iter().collect();
    ordered.sort_by(|a, b| {
        a.left_x()
            .partial_cmp(&b.left_x())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}
