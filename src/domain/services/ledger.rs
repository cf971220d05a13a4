//! Weighted-average cost ledger.
//!
//! Purchases and plate printing both add stock through [`apply_addition`];
//! sales go through the same entry point with a negative quantity.

use serde::Serialize;
use crate::domain::aggregates::{Product, ProductId};

/// Before/after snapshot of one stock movement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_cost: f64,
    pub previous_stock: i64,
    pub previous_cost: f64,
    pub new_stock: i64,
    pub new_cost: f64,
}

/// Adds `added_qty` units costing `added_unit_cost` each.
///
/// With stock on hand the new cost is the quantity-weighted blend of the old
/// and incoming cost; an empty (or oversold) line simply takes the incoming
/// cost. Zero or negative quantities only move stock.
pub fn apply_addition(product: &mut Product, added_qty: i64, added_unit_cost: f64) -> LedgerEntry {
    let (previous_stock, previous_cost) = (product.stock, product.cost);
    if added_qty > 0 {
        product.cost = if previous_stock > 0 {
            weighted_average(previous_stock, previous_cost, added_qty, added_unit_cost)
        } else {
            added_unit_cost
        };
    }
    product.stock += added_qty;
    LedgerEntry {
        product_id: product.id,
        quantity: added_qty,
        unit_cost: added_unit_cost,
        previous_stock,
        previous_cost,
        new_stock: product.stock,
        new_cost: product.cost,
    }
}

pub fn weighted_average(stock: i64, cost: f64, added_qty: i64, added_unit_cost: f64) -> f64 {
    let total = stock + added_qty;
    if total <= 0 { return added_unit_cost; }
    (stock as f64 * cost + added_qty as f64 * added_unit_cost) / total as f64
}
