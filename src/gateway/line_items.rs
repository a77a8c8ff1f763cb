//! Line items embedded in checkout session metadata as a JSON array.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ITEMS_METADATA_KEY: &str = "items_json";
pub const MAX_LINE_ITEMS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Uuid,
    #[serde(default = "default_qty")]
    pub qty: u32,
    pub price: Decimal,
    #[serde(default)]
    pub variant_id: Option<Uuid>,
}

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Error)]
pub enum LineItemsError {
    #[error("line items are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("too many line items: {0} (max {MAX_LINE_ITEMS})")]
    TooMany(usize),
    #[error("line item {0} has a non-positive quantity")]
    InvalidQuantity(Uuid),
    #[error("line item {0} has a negative price")]
    NegativePrice(Uuid),
    #[error("line item {0} has a price with more than two decimal places")]
    PriceScale(Uuid),
}

/// Parse-or-reject: any invalid entry rejects the whole array.
pub fn parse_line_items(raw: &str) -> Result<Vec<LineItem>, LineItemsError> {
    let items: Vec<LineItem> = serde_json::from_str(raw)?;
    if items.len() > MAX_LINE_ITEMS {
        return Err(LineItemsError::TooMany(items.len()));
    }
    for item in &items {
        if item.qty == 0 || item.qty > i32::MAX as u32 {
            return Err(LineItemsError::InvalidQuantity(item.id));
        }
        if item.price.is_sign_negative() {
            return Err(LineItemsError::NegativePrice(item.id));
        }
        // Order item prices are NUMERIC(12,2); trailing zeros are fine.
        if item.price.normalize().scale() > 2 {
            return Err(LineItemsError::PriceScale(item.id));
        }
    }
    Ok(items)
}

/// Line items from session metadata. Missing or malformed metadata
/// degrades to an empty list so the order itself is still recorded.
pub fn line_items_from_metadata(metadata: &HashMap<String, String>) -> Vec<LineItem> {
    let Some(raw) = metadata.get(ITEMS_METADATA_KEY) else {
        tracing::warn!("checkout session has no line item metadata");
        return Vec::new();
    };
    match parse_line_items(raw) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, "discarding malformed line item metadata");
            Vec::new()
        }
    }
}

/// One row per product: later lines for an already-seen product are dropped.
pub fn dedupe_by_product(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let first = seen.insert(item.id);
            if !first {
                tracing::warn!(product_id = %item.id, "duplicate product in line items dropped");
            }
            first
        })
        .collect()
}

pub fn total_quantity(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.qty)).sum()
}
