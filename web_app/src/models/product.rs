use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub sku: Option<String>,
    pub name: String,
    pub description: String,
    pub has_sizes: bool,
    pub price: Decimal,
    pub rating: Option<Decimal>,
    pub image_url: Option<String>,
    pub image: Option<String>,
}

/// Sizes offered for products with `has_sizes`
pub const PRODUCT_SIZES: [(&str, &str); 5] = [
    ("xs", "Extra Small"),
    ("s", "Small"),
    ("m", "Medium"),
    ("l", "Large"),
    ("xl", "Extra Large"),
];

pub fn is_valid_size(size: &str) -> bool {
    PRODUCT_SIZES.iter().any(|(code, _)| *code == size)
}
