//! Price-like token classification.
//!
//! Tokens are normalized before matching: spaces are removed, `,` becomes
//! `.`, and the currency glyphs `€ $ £` become the letters `E S L` so a
//! currency marker is matched as a single ASCII letter before or after the
//! amount.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::config::BareIntegerPolicy;

/// A named pattern a price-like token may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceRule {
    /// Optional leading currency letter, then `digits.dd` (`12.99`, `L12.99`).
    PrefixedDecimal,
    /// `digits.dd` with an optional trailing currency letter (`12.99L`).
    SuffixedDecimal,
    /// Digits only (`12`). Quantities and codes match too.
    BareInteger,
}

impl PriceRule {
    /// Every rule, in matching order.
    pub const ALL: [PriceRule; 3] = [
        PriceRule::PrefixedDecimal,
        PriceRule::SuffixedDecimal,
        PriceRule::BareInteger,
    ];

    /// Regex source, applied to the normalized token.
    pub fn pattern(self) -> &'static str {
        match self {
            PriceRule::PrefixedDecimal => r"^[A-Z]?\d+\.\d{2}$",
            PriceRule::SuffixedDecimal => r"^\d+\.\d{2}[A-Z]?$",
            PriceRule::BareInteger => r"^\d+$",
        }
    }

    /// Whether the rule requires a cents part.
    pub fn is_decimal(self) -> bool {
        !matches!(self, PriceRule::BareInteger)
    }
}

/// Normalize a token for matching.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ')
        .map(|c| match c {
            ',' => '.',
            '€' => 'E',
            '$' => 'S',
            '£' => 'L',
            other => other,
        })
        .collect()
}

/// Compiled set of price rules.
#[derive(Debug, Clone)]
pub struct PriceClassifier {
    rules: Vec<(PriceRule, Regex)>,
}

impl PriceClassifier {
    /// Classifier with every rule enabled.
    pub fn new() -> Self {
        Self::with_rules(&PriceRule::ALL)
    }

    /// Classifier restricted to `rules`. Matching order stays that of [`PriceRule::ALL`].
    pub fn with_rules(rules: &[PriceRule]) -> Self {
        let rules = PriceRule::ALL
            .iter()
            .filter(|rule| rules.contains(*rule))
            .map(|&rule| {
                let regex = Regex::new(rule.pattern()).expect("invalid price pattern");
                (rule, regex)
            })
            .collect();
        Self { rules }
    }

    /// Classifier matching a bare-integer policy.
    pub fn for_policy(policy: BareIntegerPolicy) -> Self {
        match policy {
            BareIntegerPolicy::Never => {
                Self::with_rules(&[PriceRule::PrefixedDecimal, PriceRule::SuffixedDecimal])
            }
            BareIntegerPolicy::Always | BareIntegerPolicy::WhenNoDecimal => Self::new(),
        }
    }

    /// Enabled rules, in matching order.
    pub fn rules(&self) -> impl Iterator<Item = PriceRule> + '_ {
        self.rules.iter().map(|(rule, _)| *rule)
    }

    /// First rule the token matches, if any.
    pub fn classify(&self, text: &str) -> Option<PriceRule> {
        let cleaned = normalize(text);
        self.rules
            .iter()
            .find(|(_, regex)| regex.is_match(&cleaned))
            .map(|(rule, _)| *rule)
    }

    /// Whether the token looks like a monetary amount.
    pub fn is_price(&self, text: &str) -> bool {
        self.classify(text).is_some()
    }
}

impl Default for PriceClassifier {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref DEFAULT_CLASSIFIER: PriceClassifier = PriceClassifier::new();
}

/// Whether the token looks like a monetary amount, using every rule.
pub fn is_price(text: &str) -> bool {
    DEFAULT_CLASSIFIER.is_price(text)
}

/// Like [`is_price`] for untyped OCR output. Anything but a JSON string is not a price.
pub fn is_price_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_price)
}
