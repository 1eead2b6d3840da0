//! Extracted receipt records.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One product label paired with the raw price text found on its line.
///
/// Serializes as a 2-element array: `["Milk", "2.50"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ProductPrice {
    /// Space-joined, trimmed non-price tokens left of the price.
    pub product: String,

    /// Price text exactly as recognized (not normalized).
    pub price: String,
}

impl ProductPrice {
    pub fn new(product: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            price: price.into(),
        }
    }
}

impl From<(String, String)> for ProductPrice {
    fn from((product, price): (String, String)) -> Self {
        Self { product, price }
    }
}

impl From<ProductPrice> for (String, String) {
    fn from(record: ProductPrice) -> Self {
        (record.product, record.price)
    }
}

impl std::fmt::Display for ProductPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.product, self.price)
    }
}

/// Render records as a JSON array of `[product, price]` pairs.
pub fn records_to_json(records: &[ProductPrice]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Read records from a JSON array of `[product, price]` pairs.
pub fn records_from_json(json: &str) -> Result<Vec<ProductPrice>> {
    Ok(serde_json::from_str(json)?)
}
