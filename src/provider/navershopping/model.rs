//! Data model for the price-watch reference provider: the wire shape
//! returned by the upstream search API, and the snapshot/diff types the
//! provider persists and reports.

use serde::{Deserialize, Serialize};

/// One page of the upstream product-search API response.
#[derive(Debug, Clone, Deserialize)]
pub struct NaverSearchResponse {
    pub total: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub display: u64,
    #[serde(default)]
    pub items: Vec<NaverItem>,
}

/// One raw item as returned by the upstream API, before parsing/filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct NaverItem {
    pub title: String,
    pub link: String,
    #[serde(rename = "lprice")]
    pub lprice: String,
    #[serde(rename = "mallName")]
    pub mall_name: String,
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "productType")]
    pub product_type: String,
}

/// One product retained after parsing and filtering. `product_id` is the
/// snapshot key; equality of "content" (used to detect metadata-only drift)
/// excludes `product_id` and `low_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_type: String,
    pub title: String,
    pub link: String,
    pub low_price: i64,
    pub mall_name: String,
}

impl Product {
    /// `true` iff the display-facing metadata (type, title, link, mall) is
    /// identical. `low_price` and `product_id` are deliberately excluded —
    /// callers compare those separately.
    pub fn content_equals(&self, other: &Product) -> bool {
        self.product_type == other.product_type
            && self.title == other.title
            && self.link == other.link
            && self.mall_name == other.mall_name
    }
}

/// The full set of products observed in one run. Persisted as the provider's
/// opaque snapshot via `serde_json::Value`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub products: Vec<Product>,
}

impl ProductSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn empty() -> serde_json::Value {
        serde_json::to_value(ProductSnapshot::default()).expect("ProductSnapshot is always serializable")
    }
}

/// One reported change between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffKind {
    New,
    PriceChanged,
}

/// A single product diff, as produced by `compare` and consumed by the
/// rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDiff {
    pub kind: DiffKind,
    pub product: Product,
    /// Populated only for `DiffKind::PriceChanged`.
    pub prev: Option<Product>,
}
