//! Plate lifecycle over a loaded plates table: `pending -> printed`.

use chrono::{DateTime, Utc};
use tracing::info;
use crate::domain::aggregates::{PlateError, PlateId, PrintingPlate, Product};
use super::allocation::{apply_plate, PlateApplication};

pub fn print_plate(
    plates: &mut [PrintingPlate],
    plate_id: PlateId,
    catalog: Vec<Product>,
    printed_at: DateTime<Utc>,
) -> Result<PlateApplication, PlateError> {
    let plate = plates.iter_mut().find(|p| p.id == plate_id).ok_or(PlateError::NotFound(plate_id))?;
    apply_plate(plate, catalog, printed_at)
}

/// Removes a pending plate from the table. Printed plates stay.
pub fn delete_plate(plates: &mut Vec<PrintingPlate>, plate_id: PlateId) -> Result<PrintingPlate, PlateError> {
    let index = plates.iter().position(|p| p.id == plate_id).ok_or(PlateError::NotFound(plate_id))?;
    plates[index].ensure_pending()?;
    info!(plate_id, "deleted pending plate");
    Ok(plates.remove(index))
}
