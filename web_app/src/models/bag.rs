use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::product::Product;

/// What the bag holds for one product: a plain quantity, or quantities per
/// size for products sold in sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BagItem {
    Quantity(u32),
    Sized { items_by_size: BTreeMap<String, u32> },
}

/// Session shopping bag, keyed by product id. Serialized as the JSON that
/// also travels in the payment intent metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag(pub BTreeMap<String, BagItem>);

impl Bag {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a bag; anything that is not a bag object yields an empty one.
    pub fn from_json_lossy(value: &str) -> Self {
        serde_json::from_str(value).unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }

    /// Every `(product_id, size, quantity)` held, skipping ids that are not
    /// numeric.
    pub fn entries(&self) -> Vec<(i64, Option<String>, u32)> {
        self.0
            .iter()
            .filter_map(|(item_id, item)| item_id.parse::<i64>().ok().map(|id| (id, item)))
            .flat_map(|(id, item)| match item {
                BagItem::Quantity(quantity) => vec![(id, None, *quantity)],
                BagItem::Sized { items_by_size } => items_by_size
                    .iter()
                    .map(|(size, quantity)| (id, Some(size.clone()), *quantity))
                    .collect(),
            })
            .collect()
    }

    pub fn add(&mut self, product_id: i64, quantity: u32, size: Option<&str>) {
        let key = product_id.to_string();
        match size {
            None => {
                let current = match self.0.get(&key) {
                    Some(BagItem::Quantity(q)) => *q,
                    _ => 0,
                };
                self.0
                    .insert(key, BagItem::Quantity(current.saturating_add(quantity)));
            }
            Some(size) => {
                let entry = self.0.entry(key).or_insert_with(|| BagItem::Sized {
                    items_by_size: BTreeMap::new(),
                });
                if let BagItem::Quantity(_) = entry {
                    *entry = BagItem::Sized {
                        items_by_size: BTreeMap::new(),
                    };
                }
                if let BagItem::Sized { items_by_size } = entry {
                    let current = items_by_size.entry(size.to_string()).or_insert(0);
                    *current = current.saturating_add(quantity);
                }
            }
        }
    }

    /// Removes a product, or only one of its sizes.
    pub fn remove(&mut self, product_id: i64, size: Option<&str>) {
        let key = product_id.to_string();
        if let (Some(size), Some(BagItem::Sized { items_by_size })) = (size, self.0.get_mut(&key)) {
            items_by_size.remove(size);
            if !items_by_size.is_empty() {
                return;
            }
        }
        self.0.remove(&key);
    }
}

/// Delivery charge rules shared by the bag summary and order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub free_delivery_threshold: Decimal,
    pub standard_delivery_percentage: Decimal,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            free_delivery_threshold: dec!(50),
            standard_delivery_percentage: dec!(10),
        }
    }
}

impl DeliveryPolicy {
    /// `(delivery, free_delivery_delta)` for a bag total
    pub fn delivery_for(&self, total: Decimal) -> (Decimal, Decimal) {
        if total < self.free_delivery_threshold {
            (
                (total * self.standard_delivery_percentage / dec!(100)).round_dp(2),
                self.free_delivery_threshold - total,
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BagLine {
    pub item_id: i64,
    pub quantity: u32,
    pub product: Product,
    pub size: Option<String>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BagSummary {
    pub bag_items: Vec<BagLine>,
    pub total: Decimal,
    pub product_count: u32,
    pub delivery: Decimal,
    pub free_delivery_delta: Decimal,
    pub free_delivery_threshold: Decimal,
    pub grand_total: Decimal,
}
