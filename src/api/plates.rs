use std::collections::BTreeMap;
use axum::{extract::{Path, State}, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::{next_id, PlateError, PlateId, PrintingPlate, Product, ProductId};
use crate::domain::events::{DomainEvent, PlateEvent, ProductEvent};
use crate::domain::services::{self, Allocation, LedgerEntry, PreviewReport};
use crate::domain::value_objects::SizeKey;
use crate::InventoryError;
use super::{ApiResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlateRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    #[serde(default)]
    pub stickers_quantities: BTreeMap<String, u32>,
    pub small_stickers_quantity: Option<u32>,
    pub large_stickers_quantity: Option<u32>,
}

impl CreatePlateRequest {
    /// Normalized quantity map; the legacy `chico`/`grande` fields only fill
    /// keys the map does not mention.
    fn quantities(&self) -> Result<BTreeMap<SizeKey, u32>, InventoryError> {
        let mut quantities = BTreeMap::new();
        for (raw, qty) in &self.stickers_quantities {
            let slot = quantities.entry(SizeKey::new(raw.as_str())?).or_insert(0u32);
            *slot = slot.checked_add(*qty).ok_or(InventoryError::InvalidQuantity)?;
        }
        for (key, legacy) in [(SizeKey::small(), self.small_stickers_quantity), (SizeKey::large(), self.large_stickers_quantity)] {
            if let Some(qty) = legacy { quantities.entry(key).or_insert(qty); }
        }
        Ok(quantities)
    }
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub plate: PrintingPlate,
    pub allocation: Allocation,
    pub entries: Vec<LedgerEntry>,
    pub created_products: Vec<Product>,
}

pub async fn list_plates(State(s): State<AppState>) -> ApiResult<Json<Vec<PrintingPlate>>> {
    Ok(Json(s.repo.load_plates().await?))
}

pub async fn get_plate(State(s): State<AppState>, Path(id): Path<PlateId>) -> ApiResult<Json<PrintingPlate>> {
    s.repo.load_plate(id).await?.map(Json).ok_or(PlateError::NotFound(id).into())
}

pub async fn create_plate(State(s): State<AppState>, Json(r): Json<CreatePlateRequest>) -> ApiResult<(StatusCode, Json<PrintingPlate>)> {
    r.validate()?;
    let quantities = r.quantities()?;
    let plate = {
        let _guard = s.writer.lock().await;
        let mut plates = s.repo.load_plates().await?;
        let id = next_id(plates.iter().map(|p| p.id));
        let plate = PrintingPlate::create(id, r.name, r.cost.unwrap_or(s.default_plate_cost), quantities, Utc::now());
        plates.push(plate.clone());
        s.repo.save_plates(&plates).await?;
        plate
    };
    tracing::info!(plate_id = plate.id, cost = plate.cost, stickers = plate.total_quantity(), "created plate");
    s.publish(vec![DomainEvent::Plate(PlateEvent::Created { plate_id: plate.id })]).await;
    Ok((StatusCode::CREATED, Json(plate)))
}

pub async fn preview_plate(State(s): State<AppState>, Path(id): Path<PlateId>) -> ApiResult<Json<PreviewReport>> {
    let plates = s.repo.load_plates().await?;
    let catalog = s.repo.load_catalog().await?;
    services::preview_plate(&plates, id, &catalog).map(Json).ok_or(PlateError::NotFound(id).into())
}

pub async fn print_plate(State(s): State<AppState>, Path(id): Path<PlateId>) -> ApiResult<Json<PrintResponse>> {
    let (plate, application) = {
        let _guard = s.writer.lock().await;
        let mut plates = s.repo.load_plates().await?;
        let catalog = s.repo.load_catalog().await?;
        let application = services::print_plate(&mut plates, id, catalog, Utc::now())?;
        // plate first: a failed catalog write must not let a retry add the stock twice
        s.repo.save_plates(&plates).await?;
        s.repo.save_catalog(&application.catalog).await?;
        let plate = plates.into_iter().find(|p| p.id == id).ok_or(PlateError::NotFound(id))?;
        (plate, application)
    };

    let mut events: Vec<DomainEvent> = application
        .created
        .iter()
        .filter_map(|id| product(&application.catalog, *id))
        .filter_map(|p| p.size.clone().map(|size_key| ProductEvent::Synthesized { product_id: p.id, size_key }))
        .map(DomainEvent::Product)
        .collect();
    events.extend(application.entries.iter().map(|e| {
        DomainEvent::Product(ProductEvent::StockAdded { product_id: e.product_id, quantity: e.quantity, unit_cost: e.unit_cost, new_cost: e.new_cost })
    }));
    events.push(DomainEvent::Plate(PlateEvent::Printed {
        plate_id: plate.id,
        mode: application.allocation.mode,
        total_quantity: application.allocation.total_quantity,
    }));
    s.publish(events).await;

    let created_products = application.created.iter().filter_map(|id| product(&application.catalog, *id)).cloned().collect();
    Ok(Json(PrintResponse { plate, allocation: application.allocation, entries: application.entries, created_products }))
}

pub async fn delete_plate(State(s): State<AppState>, Path(id): Path<PlateId>) -> ApiResult<StatusCode> {
    {
        let _guard = s.writer.lock().await;
        let mut plates = s.repo.load_plates().await?;
        services::delete_plate(&mut plates, id)?;
        s.repo.save_plates(&plates).await?;
    }
    s.publish(vec![DomainEvent::Plate(PlateEvent::Deleted { plate_id: id })]).await;
    Ok(StatusCode::NO_CONTENT)
}

fn product(catalog: &[Product], id: ProductId) -> Option<&Product> {
    catalog.iter().find(|p| p.id == id)
}
