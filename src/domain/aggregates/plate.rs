//! Printing Plate Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::domain::value_objects::SizeKey;

pub type PlateId = u64;

/// Plate cost used when the creator does not state one.
pub const DEFAULT_PLATE_COST: f64 = 18500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateStatus { Pending, Printed }

/// A fixed-cost print run producing sticker stock for one or more size keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintingPlate {
    pub id: PlateId,
    pub name: String,
    pub cost: f64,
    #[serde(default)]
    pub stickers_quantities: BTreeMap<SizeKey, u32>,
    #[serde(default)]
    pub small_stickers_quantity: u32,
    #[serde(default)]
    pub large_stickers_quantity: u32,
    #[serde(default)]
    pub is_printed: bool,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_printed: Option<DateTime<Utc>>,
}

impl PrintingPlate {
    pub fn create(id: PlateId, name: impl Into<String>, cost: f64, quantities: BTreeMap<SizeKey, u32>, now: DateTime<Utc>) -> Self {
        let mut plate = Self {
            id, name: name.into(), cost, stickers_quantities: quantities,
            small_stickers_quantity: 0, large_stickers_quantity: 0,
            is_printed: false, date_created: now, date_printed: None,
        };
        plate.sync_legacy_quantities();
        plate
    }

    pub fn status(&self) -> PlateStatus {
        if self.is_printed { PlateStatus::Printed } else { PlateStatus::Pending }
    }

    /// Size keys with a positive requested quantity, in key order.
    pub fn requested(&self) -> impl Iterator<Item = (&SizeKey, u32)> {
        self.stickers_quantities.iter().filter(|(_, q)| **q > 0).map(|(k, q)| (k, *q))
    }

    pub fn total_quantity(&self) -> u64 { self.requested().map(|(_, q)| u64::from(q)).sum() }

    pub fn mark_printed(&mut self, at: DateTime<Utc>) -> Result<(), PlateError> {
        self.ensure_pending()?;
        self.is_printed = true;
        self.date_printed = Some(at);
        Ok(())
    }

    pub fn ensure_pending(&self) -> Result<(), PlateError> {
        match self.status() {
            PlateStatus::Pending => Ok(()),
            PlateStatus::Printed => Err(PlateError::AlreadyPrinted(self.id)),
        }
    }

    /// Keeps the `chico`/`grande` mirror fields and the quantity map in step.
    /// Rows written before the map existed only carry the mirrors.
    pub fn sync_legacy_quantities(&mut self) {
        if self.stickers_quantities.is_empty() {
            if self.small_stickers_quantity > 0 { self.stickers_quantities.insert(SizeKey::small(), self.small_stickers_quantity); }
            if self.large_stickers_quantity > 0 { self.stickers_quantities.insert(SizeKey::large(), self.large_stickers_quantity); }
        }
        self.small_stickers_quantity = self.stickers_quantities.get(&SizeKey::small()).copied().unwrap_or(0);
        self.large_stickers_quantity = self.stickers_quantities.get(&SizeKey::large()).copied().unwrap_or(0);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlateError {
    #[error("printing plate {0} not found")]
    NotFound(PlateId),
    #[error("printing plate {0} has already been printed")]
    AlreadyPrinted(PlateId),
}
