//! Visual line reconstruction.
//!
//! Tokens are clustered by their top edge only. A line is anchored on the
//! token that opened it: later tokens join while they stay within
//! `max_line_spacing` of the anchor's `top_y`, not of the previous member.
//! Horizontal order inside a line is left to the caller.

use serde::Serialize;

use crate::error::{ReceiptError, Result};
use crate::models::config::validate_line_spacing;
use crate::ocr::{self, Detection};

/// A detection with its precomputed top edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedToken {
    pub text: String,
    pub bbox: [f32; 8],
    /// Smallest corner y, the vertical grouping key.
    pub top_y: f32,
}

impl PositionedToken {
    pub fn new(text: impl Into<String>, bbox: [f32; 8]) -> Self {
        Self {
            text: text.into(),
            top_y: ocr::top_y(&bbox),
            bbox,
        }
    }

    /// Smallest corner x, the horizontal ordering key.
    pub fn left_x(&self) -> f32 {
        ocr::left_x(&self.bbox)
    }

    fn check(&self, index: usize) -> Result<()> {
        if !self.top_y.is_finite() {
            return Err(ReceiptError::MalformedInput(format!(
                "token {} ({:?}) has non-finite top_y {}",
                index, self.text, self.top_y
            )));
        }
        if let Some(value) = self.bbox.iter().find(|v| !v.is_finite()) {
            return Err(ReceiptError::MalformedInput(format!(
                "token {} ({:?}) has non-finite corner coordinate {}",
                index, self.text, value
            )));
        }
        Ok(())
    }
}

impl From<Detection> for PositionedToken {
    fn from(detection: Detection) -> Self {
        Self::new(detection.text, detection.bbox)
    }
}

/// Tokens sharing one horizontal band. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualLine {
    tokens: Vec<PositionedToken>,
}

impl VisualLine {
    fn open(anchor: PositionedToken) -> Self {
        Self {
            tokens: vec![anchor],
        }
    }

    /// The token that opened the line.
    pub fn anchor(&self) -> &PositionedToken {
        &self.tokens[0]
    }

    /// `top_y` every member is measured against.
    pub fn anchor_top(&self) -> f32 {
        self.anchor().top_y
    }

    /// Members in grouping order (ascending `top_y`).
    pub fn tokens(&self) -> &[PositionedToken] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<PositionedToken> {
        self.tokens
    }
}

/// Group tokens into visual lines, top to bottom.
///
/// Fails with `InvalidArgument` for a negative or NaN `max_line_spacing`
/// (checked before anything else) and with `MalformedInput` for a token whose
/// coordinates are not finite. An empty input yields no lines.
pub fn group_into_lines(
    mut tokens: Vec<PositionedToken>,
    max_line_spacing: f32,
) -> Result<Vec<VisualLine>> {
    validate_line_spacing(max_line_spacing)?;

    for (index, token) in tokens.iter().enumerate() {
        token.check(index)?;
    }

    // Stable: tokens with equal top_y keep their input order.
    tokens.sort_by(|a, b| {
        a.top_y
            .partial_cmp(&b.top_y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut lines: Vec<VisualLine> = Vec::new();
    let mut tokens = tokens.into_iter();
    let Some(first) = tokens.next() else {
        return Ok(lines);
    };

    let mut current_top = first.top_y;
    let mut current_line = VisualLine::open(first);

    for token in tokens {
        if (token.top_y - current_top).abs() <= max_line_spacing {
            current_line.tokens.push(token);
        } else {
            current_top = token.top_y;
            lines.push(std::mem::replace(&mut current_line, VisualLine::open(token)));
        }
    }

    lines.push(current_line);
    Ok(lines)
}
