//! Print shop inventory
//!
//! Stock and cost tracking for a print and apparel shop.
//!
//! ## Features
//! - Product catalog with weighted-average unit cost
//! - Purchases and sales
//! - Customer reservations with deposits
//! - Printing plates: a fixed-cost print run turned into sticker stock,
//!   its cost split across sizes by sticker area

pub mod api;
pub mod config;
pub mod domain;
pub mod store;

use thiserror::Error;

pub use config::AppConfig;
pub use domain::aggregates::{
    Category, PlateError, PlateId, PrintingPlate, Product, ProductId, Purchase, Reservation, ReservationError, Sale,
};
pub use domain::services::{apply_plate, preview_plate, Allocation, CostMode, PlateApplication, PreviewReport};
pub use domain::value_objects::{Dimensions, SizeKey, SizeKeyError};
pub use store::{CatalogStore, JsonFileStore, MemoryStore, Repository, StoreError, Table};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Plate(#[from] PlateError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Invalid size key: {0}")]
    InvalidSizeKey(#[from] SizeKeyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
