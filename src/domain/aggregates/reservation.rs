//! Reservation Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::product::ProductId;
use super::purchase::SaleId;

pub type ReservationId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus { #[default] Pending, Completed, Cancelled }

/// Goods put aside for a customer who paid part of the price up front.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub customer_name: String,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: f64,
    pub deposit: f64,
    #[serde(default)]
    pub status: ReservationStatus,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_closed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
}

impl Reservation {
    pub fn create(
        id: ReservationId,
        customer_name: impl Into<String>,
        product_id: ProductId,
        quantity: u32,
        total_price: f64,
        deposit: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, ReservationError> {
        if deposit < 0.0 { return Err(ReservationError::NegativeDeposit); }
        if deposit > total_price { return Err(ReservationError::DepositExceedsTotal { deposit, total: total_price }); }
        Ok(Self {
            id, customer_name: customer_name.into(), product_id, quantity, total_price, deposit,
            status: ReservationStatus::Pending, date_created: now, date_closed: None, sale_id: None,
        })
    }

    pub fn balance_due(&self) -> f64 { self.total_price - self.deposit }

    /// Price per unit charged when the reservation turns into a sale.
    pub fn unit_price(&self) -> f64 {
        if self.quantity == 0 { 0.0 } else { self.total_price / f64::from(self.quantity) }
    }

    pub fn complete(&mut self, sale_id: SaleId, at: DateTime<Utc>) -> Result<(), ReservationError> {
        self.ensure_pending()?;
        self.status = ReservationStatus::Completed;
        self.sale_id = Some(sale_id);
        self.date_closed = Some(at);
        Ok(())
    }

    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), ReservationError> {
        self.ensure_pending()?;
        self.status = ReservationStatus::Cancelled;
        self.date_closed = Some(at);
        Ok(())
    }

    pub fn ensure_pending(&self) -> Result<(), ReservationError> {
        match self.status {
            ReservationStatus::Pending => Ok(()),
            status => Err(ReservationError::Closed { id: self.id, status }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReservationError {
    #[error("reservation {0} not found")]
    NotFound(ReservationId),
    #[error("reservation {id} is already {status:?}")]
    Closed { id: ReservationId, status: ReservationStatus },
    #[error("deposit cannot be negative")]
    NegativeDeposit,
    #[error("deposit {deposit} exceeds total price {total}")]
    DepositExceedsTotal { deposit: f64, total: f64 },
}
