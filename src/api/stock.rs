use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::{next_id, ProductId, Purchase, Sale};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::services::{record_purchase, record_sale, LedgerEntry};
use crate::InventoryError;
use super::{ApiResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(range(min = 0.0))]
    pub unit_cost: f64,
    #[validate(length(max = 120))]
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaleRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
    /// Defaults to the product's list price.
    #[validate(range(min = 0.0))]
    pub unit_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse<T> {
    pub record: T,
    pub entry: LedgerEntry,
}

pub async fn list_purchases(State(s): State<AppState>) -> ApiResult<Json<Vec<Purchase>>> {
    Ok(Json(s.repo.load_purchases().await?))
}

pub async fn create_purchase(State(s): State<AppState>, Json(r): Json<PurchaseRequest>) -> ApiResult<(StatusCode, Json<MovementResponse<Purchase>>)> {
    r.validate()?;
    let (purchase, entry) = {
        let _guard = s.writer.lock().await;
        let mut catalog = s.repo.load_catalog().await?;
        let mut purchases = s.repo.load_purchases().await?;
        let purchase = Purchase::new(next_id(purchases.iter().map(|p| p.id)), r.product_id, r.quantity, r.unit_cost, r.supplier, Utc::now());
        let entry = record_purchase(&mut catalog, &purchase)?;
        purchases.push(purchase.clone());
        s.repo.save_catalog(&catalog).await?;
        s.repo.save_purchases(&purchases).await?;
        (purchase, entry)
    };
    tracing::info!(purchase_id = purchase.id, product_id = purchase.product_id, quantity = purchase.quantity, new_cost = entry.new_cost, "recorded purchase");
    s.publish(vec![DomainEvent::Product(ProductEvent::StockAdded {
        product_id: entry.product_id,
        quantity: entry.quantity,
        unit_cost: entry.unit_cost,
        new_cost: entry.new_cost,
    })])
    .await;
    Ok((StatusCode::CREATED, Json(MovementResponse { record: purchase, entry })))
}

pub async fn list_sales(State(s): State<AppState>) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(s.repo.load_sales().await?))
}

pub async fn create_sale(State(s): State<AppState>, Json(r): Json<SaleRequest>) -> ApiResult<(StatusCode, Json<MovementResponse<Sale>>)> {
    r.validate()?;
    let (sale, entry) = {
        let _guard = s.writer.lock().await;
        let mut catalog = s.repo.load_catalog().await?;
        let mut sales = s.repo.load_sales().await?;
        let list_price = catalog.iter().find(|p| p.id == r.product_id).map(|p| p.price).ok_or(InventoryError::ProductNotFound(r.product_id))?;
        let sale = Sale::new(next_id(sales.iter().map(|x| x.id)), r.product_id, r.quantity, r.unit_price.unwrap_or(list_price), Utc::now());
        let entry = record_sale(&mut catalog, &sale)?;
        sales.push(sale.clone());
        s.repo.save_catalog(&catalog).await?;
        s.repo.save_sales(&sales).await?;
        (sale, entry)
    };
    tracing::info!(sale_id = sale.id, product_id = sale.product_id, quantity = sale.quantity, stock = entry.new_stock, "recorded sale");
    s.publish(vec![DomainEvent::Product(ProductEvent::StockRemoved { product_id: entry.product_id, quantity: -entry.quantity })]).await;
    Ok((StatusCode::CREATED, Json(MovementResponse { record: sale, entry })))
}
