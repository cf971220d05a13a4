//! Purchase and sale stock movements.

use tracing::warn;
use crate::domain::aggregates::{Product, ProductId, Purchase, Sale};
use crate::{InventoryError, Result};
use super::ledger::{apply_addition, LedgerEntry};

fn product_mut(catalog: &mut [Product], id: ProductId) -> Result<&mut Product> {
    catalog.iter_mut().find(|p| p.id == id).ok_or(InventoryError::ProductNotFound(id))
}

/// Adds purchased units at `purchase.unit_cost`, blending the running cost.
pub fn record_purchase(catalog: &mut [Product], purchase: &Purchase) -> Result<LedgerEntry> {
    if purchase.quantity == 0 { return Err(InventoryError::InvalidQuantity); }
    let product = product_mut(catalog, purchase.product_id)?;
    Ok(apply_addition(product, i64::from(purchase.quantity), purchase.unit_cost))
}

/// Takes sold units out of stock. Overselling is allowed; stock goes negative.
pub fn record_sale(catalog: &mut [Product], sale: &Sale) -> Result<LedgerEntry> {
    if sale.quantity == 0 { return Err(InventoryError::InvalidQuantity); }
    let product = product_mut(catalog, sale.product_id)?;
    let cost = product.cost;
    let entry = apply_addition(product, -i64::from(sale.quantity), cost);
    if entry.new_stock < 0 {
        warn!(product_id = entry.product_id, stock = entry.new_stock, "product oversold");
    }
    Ok(entry)
}
