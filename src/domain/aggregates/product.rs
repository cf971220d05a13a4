//! Product Aggregate

use serde::{Deserialize, Deserializer, Serialize};
use crate::domain::value_objects::{Dimensions, SizeKey};
use super::next_id;

pub type ProductId = u64;

/// Unknown category strings decode as [`Category::Other`] so one odd row
/// cannot make the whole products table unreadable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "remera", alias = "Shirt", alias = "Remera")]
    Shirt,
    #[serde(alias = "totebag", alias = "Tote", alias = "Totebag")]
    Tote,
    #[serde(alias = "Sticker")]
    Sticker,
    #[serde(other)]
    Other,
}

/// A catalog line. `cost` is the running weighted-average unit cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_mm2: Option<f64>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, category: Category, price: f64) -> Self {
        Self {
            id, name: name.into(), category, price, stock: 0, cost: 0.0,
            size: None, width_mm: None, height_mm: None, area_mm2: None,
        }
    }

    /// SKU created on the fly for a plate size nobody stocks yet.
    pub fn synthesized_sticker(id: ProductId, size: &SizeKey) -> Self {
        let product = Self::new(id, format!("Sticker {size}"), Category::Sticker, 0.0).with_size(size.clone());
        match size.dimensions() {
            Some(dims) => product.with_dimensions(dims),
            None => product,
        }
    }

    pub fn with_size(mut self, size: SizeKey) -> Self { self.size = Some(size); self }

    pub fn with_dimensions(mut self, dims: Dimensions) -> Self {
        self.width_mm = Some(dims.width_mm);
        self.height_mm = Some(dims.height_mm);
        self.area_mm2 = Some(dims.area_mm2());
        self
    }

    pub fn is_sticker(&self) -> bool { self.category == Category::Sticker }

    /// `area_mm2` wins over `width_mm * height_mm`; non-positive values count as absent.
    pub fn effective_area(&self) -> Option<f64> {
        let positive = |v: Option<f64>| v.filter(|v| *v > 0.0);
        positive(self.area_mm2).or_else(|| match (positive(self.width_mm), positive(self.height_mm)) {
            (Some(w), Some(h)) => Some(w * h),
            _ => None,
        })
    }

    /// Key this product is grouped under when allocating plates.
    pub fn binding_key(&self) -> SizeKey { self.size.clone().unwrap_or_else(SizeKey::unknown) }

    pub fn next_id(catalog: &[Product]) -> ProductId { next_id(catalog.iter().map(|p| p.id)) }

    /// Catalog written on first start when the products table is empty.
    pub fn seed_catalog() -> Vec<Product> {
        vec![
            Product::new(1, "Remera", Category::Shirt, 15000.0),
            Product::new(2, "Tote bag", Category::Tote, 9000.0),
            Product::new(3, "Sticker Chico", Category::Sticker, 500.0).with_size(SizeKey::small()),
            Product::new(4, "Sticker Grande", Category::Sticker, 1500.0).with_size(SizeKey::large()),
        ]
    }
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SizeKey>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => SizeKey::new(s).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
