//! Purchase and Sale records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::product::ProductId;
use super::reservation::ReservationId;

pub type PurchaseId = u64;
pub type SaleId = u64;

/// Stock bought from a supplier; feeds the weighted-average cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_cost: f64,
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub date: DateTime<Utc>,
}

impl Purchase {
    pub fn new(id: PurchaseId, product_id: ProductId, quantity: u32, unit_cost: f64, supplier: Option<String>, date: DateTime<Utc>) -> Self {
        Self { id, product_id, quantity, unit_cost, total_cost: unit_cost * f64::from(quantity), supplier, date }
    }
}

/// Units leaving stock, either over the counter or by completing a reservation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<ReservationId>,
    pub date: DateTime<Utc>,
}

impl Sale {
    pub fn new(id: SaleId, product_id: ProductId, quantity: u32, unit_price: f64, date: DateTime<Utc>) -> Self {
        Self { id, product_id, quantity, unit_price, total: unit_price * f64::from(quantity), reservation_id: None, date }
    }

    pub fn for_reservation(mut self, reservation_id: ReservationId) -> Self {
        self.reservation_id = Some(reservation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let now = Utc::now();
        assert_eq!(Purchase::new(1, 3, 40, 12.5, None, now).total_cost, 500.0);
        let sale = Sale::new(1, 3, 3, 500.0, now).for_reservation(9);
        assert_eq!(sale.total, 1500.0);
        assert_eq!(sale.reservation_id, Some(9));
    }
}
