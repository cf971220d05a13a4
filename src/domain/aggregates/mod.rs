//! Aggregates module
pub mod product;
pub mod plate;
pub mod purchase;
pub mod reservation;

pub use product::{Category, Product, ProductId};
pub use plate::{PlateError, PlateId, PlateStatus, PrintingPlate, DEFAULT_PLATE_COST};
pub use purchase::{Purchase, PurchaseId, Sale, SaleId};
pub use reservation::{Reservation, ReservationError, ReservationId, ReservationStatus};

/// `max(existing) + 1`, or `1` for an empty table.
pub fn next_id(ids: impl IntoIterator<Item = u64>) -> u64 {
    ids.into_iter().max().map_or(1, |max| max + 1)
}
