//! Domain services: cost ledger, area resolution, plate allocation
pub mod allocation;
pub mod area;
pub mod ledger;
pub mod lifecycle;
pub mod stock;

pub use allocation::{apply_plate, preview_plate, split_quantity, Allocation, CostMode, PlateApplication, PreviewReport, Share, SizeAllocation};
pub use area::resolve_unit_area;
pub use ledger::{apply_addition, weighted_average, LedgerEntry};
pub use lifecycle::{delete_plate, print_plate};
pub use stock::{record_purchase, record_sale};
