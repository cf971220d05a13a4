//! Printing plate cost allocation.
//!
//! A plate is a fixed-cost print run. Its cost is spread over every sticker
//! it produces, weighted by sticker area when every requested size has a
//! known area ([`CostMode::Area`]) and flat per sticker otherwise
//! ([`CostMode::Count`]). Mixing the two inside one plate would stop the
//! per-unit costs from adding up to the plate cost, so the mode is chosen
//! once for the whole plate.
//!
//! [`Allocation::compute`] is pure; [`apply_plate`] synthesizes missing
//! SKUs, computes the allocation against the result and feeds every share
//! through the cost ledger.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use crate::domain::aggregates::{PlateError, PlateId, PrintingPlate, Product, ProductId};
use crate::domain::value_objects::SizeKey;
use super::area::resolve_unit_area;
use super::ledger::{apply_addition, LedgerEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMode { Area, Count }

/// Part of a size's quantity assigned to one product.
///
/// `product_id` is `None` only in a preview, for a size no product is bound
/// to yet; printing would create that product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Share {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub area_mm2: Option<f64>,
    pub unit_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SizeAllocation {
    pub size_key: SizeKey,
    pub quantity: u32,
    pub unit_area_mm2: Option<f64>,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub shares: Vec<Share>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Allocation {
    pub mode: CostMode,
    pub plate_cost: f64,
    pub total_area_mm2: f64,
    pub total_quantity: u64,
    pub sizes: Vec<SizeAllocation>,
}

struct DraftShare<'a> {
    product: Option<&'a Product>,
    quantity: u32,
    area: Option<f64>,
}

struct DraftSize<'a> {
    key: &'a SizeKey,
    quantity: u32,
    unit_area: Option<f64>,
    shares: Vec<DraftShare<'a>>,
}

impl Allocation {
    /// Splits and prices `plate` against `catalog` without touching either.
    pub fn compute(plate: &PrintingPlate, catalog: &[Product]) -> Self {
        let bindings = group_by_size(catalog);

        let drafts: Vec<DraftSize> = plate
            .requested()
            .map(|(key, quantity)| {
                let bound = bindings.get(key).map(Vec::as_slice).unwrap_or_default();
                let unit_area = resolve_unit_area(key, bound);
                let shares = if bound.is_empty() {
                    vec![DraftShare { product: None, quantity, area: unit_area }]
                } else {
                    split_quantity(quantity, bound.len())
                        .into_iter()
                        .zip(bound)
                        .map(|(quantity, p)| DraftShare { product: Some(*p), quantity, area: p.effective_area().or(unit_area) })
                        .collect()
                };
                DraftSize { key, quantity, unit_area, shares }
            })
            .collect();

        let total_quantity: u64 = drafts.iter().map(|d| u64::from(d.quantity)).sum();
        let total_area: f64 = drafts
            .iter()
            .flat_map(|d| &d.shares)
            .filter_map(|s| s.area.map(|a| a * f64::from(s.quantity)))
            .sum();
        let mode = if total_area > 0.0 && drafts.iter().all(|d| d.unit_area.is_some()) {
            CostMode::Area
        } else {
            CostMode::Count
        };
        debug!(plate_id = plate.id, ?mode, total_area, total_quantity, "selected plate cost mode");

        let per_sticker = plate.cost / total_quantity.max(1) as f64;
        let unit_cost = |area: Option<f64>| match (mode, area) {
            (CostMode::Area, Some(area)) => plate.cost / total_area * area,
            _ => per_sticker,
        };

        let sizes = drafts
            .into_iter()
            .map(|draft| {
                let shares: Vec<Share> = draft
                    .shares
                    .into_iter()
                    .map(|s| Share {
                        product_id: s.product.map(|p| p.id),
                        product_name: s.product.map_or_else(|| format!("Sticker {}", draft.key), |p| p.name.clone()),
                        quantity: s.quantity,
                        area_mm2: s.area,
                        unit_cost: unit_cost(s.area),
                    })
                    .collect();
                let total_cost = shares.iter().map(|s| s.unit_cost * f64::from(s.quantity)).sum();
                debug!(size_key = %draft.key, quantity = draft.quantity, products = shares.len(), total_cost, "allocated size");
                SizeAllocation {
                    size_key: draft.key.clone(),
                    quantity: draft.quantity,
                    unit_area_mm2: draft.unit_area,
                    unit_cost: unit_cost(draft.unit_area),
                    total_cost,
                    shares,
                }
            })
            .collect();

        Self { mode, plate_cost: plate.cost, total_area_mm2: total_area, total_quantity, sizes }
    }

    /// Sum of `unit_cost * quantity` over every share.
    pub fn allocated_cost(&self) -> f64 { self.sizes.iter().map(|s| s.total_cost).sum() }
}

/// Sticker products grouped by size key, catalog order kept inside each group.
fn group_by_size(catalog: &[Product]) -> BTreeMap<SizeKey, Vec<&Product>> {
    let mut groups: BTreeMap<SizeKey, Vec<&Product>> = BTreeMap::new();
    for product in catalog.iter().filter(|p| p.is_sticker()) {
        groups.entry(product.binding_key()).or_default().push(product);
    }
    groups
}

/// Floor split; the first `quantity % parts` slots get one extra unit.
pub fn split_quantity(quantity: u32, parts: usize) -> Vec<u32> {
    if parts == 0 { return Vec::new(); }
    let (quantity, parts) = (u64::from(quantity), parts as u64);
    let (base, remainder) = (quantity / parts, quantity % parts);
    // every slot is at most `quantity`, so it fits back into u32
    (0..parts).map(|i| (base + u64::from(i < remainder)) as u32).collect()
}

/// Outcome of printing a plate. `catalog` is the full updated table.
#[derive(Clone, Debug, Serialize)]
pub struct PlateApplication {
    #[serde(skip)]
    pub catalog: Vec<Product>,
    pub allocation: Allocation,
    pub entries: Vec<LedgerEntry>,
    pub created: Vec<ProductId>,
}

/// Prints `plate`: creates SKUs for unbound sizes, adds the allocated stock
/// and cost to each product and marks the plate printed.
///
/// A printed plate is rejected before anything is computed, and the catalog
/// is only ever touched as the owned copy returned in the result.
pub fn apply_plate(plate: &mut PrintingPlate, mut catalog: Vec<Product>, printed_at: DateTime<Utc>) -> Result<PlateApplication, PlateError> {
    plate.ensure_pending()?;

    let created = synthesize_missing(plate, &mut catalog);
    let allocation = Allocation::compute(plate, &catalog);

    let mut entries = Vec::new();
    for share in allocation.sizes.iter().flat_map(|s| &s.shares).filter(|s| s.quantity > 0) {
        let Some(product) = share.product_id.and_then(|id| catalog.iter_mut().find(|p| p.id == id)) else { continue };
        entries.push(apply_addition(product, i64::from(share.quantity), share.unit_cost));
    }

    plate.mark_printed(printed_at)?;
    info!(
        plate_id = plate.id,
        mode = ?allocation.mode,
        stickers = allocation.total_quantity,
        products = entries.len(),
        created = created.len(),
        "printed plate"
    );
    Ok(PlateApplication { catalog, allocation, entries, created })
}

fn synthesize_missing(plate: &PrintingPlate, catalog: &mut Vec<Product>) -> Vec<ProductId> {
    let mut created = Vec::new();
    for (key, _) in plate.requested() {
        if catalog.iter().any(|p| p.is_sticker() && p.binding_key() == *key) { continue; }
        let product = Product::synthesized_sticker(Product::next_id(catalog), key);
        info!(product_id = product.id, size_key = %key, "created sticker product for unbound size");
        created.push(product.id);
        catalog.push(product);
    }
    created
}

/// What printing a plate would do, without doing it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewReport {
    pub plate_id: PlateId,
    pub plate_name: String,
    pub is_printed: bool,
    pub allocated_cost: f64,
    pub allocation: Allocation,
}

impl PreviewReport {
    pub fn for_plate(plate: &PrintingPlate, catalog: &[Product]) -> Self {
        let allocation = Allocation::compute(plate, catalog);
        Self {
            plate_id: plate.id,
            plate_name: plate.name.clone(),
            is_printed: plate.is_printed,
            allocated_cost: allocation.allocated_cost(),
            allocation,
        }
    }
}

/// `None` when no plate has `plate_id`.
pub fn preview_plate(plates: &[PrintingPlate], plate_id: PlateId, catalog: &[Product]) -> Option<PreviewReport> {
    plates.iter().find(|p| p.id == plate_id).map(|plate| PreviewReport::for_plate(plate, catalog))
}
