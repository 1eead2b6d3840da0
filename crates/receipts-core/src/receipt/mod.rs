//! Receipt layout reconstruction and product/price extraction.

mod extractor;
pub mod lines;
mod parser;
pub mod price;

pub use extractor::{ReceiptExtraction, RecordExtractor};
pub use lines::{group_into_lines, PositionedToken, VisualLine};
pub use parser::ReceiptParser;
pub use price::{is_price, is_price_value, PriceClassifier, PriceRule};
