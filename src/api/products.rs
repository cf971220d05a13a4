use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;
use crate::domain::aggregates::{Category, Product, ProductId};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::SizeKey;
use crate::InventoryError;
use super::{ApiResult, AppState};

/// Body for create and update. Stock and cost only move through purchases,
/// sales and plates.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub category: Category,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub size: Option<String>,
    #[validate(range(min = 0.0))]
    pub width_mm: Option<f64>,
    #[validate(range(min = 0.0))]
    pub height_mm: Option<f64>,
    #[validate(range(min = 0.0))]
    pub area_mm2: Option<f64>,
}

impl ProductRequest {
    fn apply_to(self, product: &mut Product) -> Result<(), InventoryError> {
        product.size = match self.size.filter(|s| !s.trim().is_empty()) {
            Some(size) => Some(SizeKey::new(size)?),
            None => None,
        };
        product.name = self.name;
        product.category = self.category;
        product.price = self.price;
        product.width_mm = self.width_mm;
        product.height_mm = self.height_mm;
        product.area_mm2 = self.area_mm2;
        Ok(())
    }
}

pub async fn list_products(State(s): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(s.repo.load_catalog().await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<ProductId>) -> ApiResult<Json<Product>> {
    s.repo.load_catalog().await?.into_iter().find(|p| p.id == id).map(Json).ok_or(InventoryError::ProductNotFound(id).into())
}

pub async fn create_product(State(s): State<AppState>, Json(r): Json<ProductRequest>) -> ApiResult<(StatusCode, Json<Product>)> {
    r.validate()?;
    let product = {
        let _guard = s.writer.lock().await;
        let mut catalog = s.repo.load_catalog().await?;
        let mut product = Product::new(Product::next_id(&catalog), "", r.category, 0.0);
        r.apply_to(&mut product)?;
        catalog.push(product.clone());
        s.repo.save_catalog(&catalog).await?;
        product
    };
    tracing::info!(product_id = product.id, name = %product.name, "created product");
    s.publish(vec![DomainEvent::Product(ProductEvent::Created { product_id: product.id, name: product.name.clone() })]).await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<ProductId>, Json(r): Json<ProductRequest>) -> ApiResult<Json<Product>> {
    r.validate()?;
    let _guard = s.writer.lock().await;
    let mut catalog = s.repo.load_catalog().await?;
    let product = catalog.iter_mut().find(|p| p.id == id).ok_or(InventoryError::ProductNotFound(id))?;
    r.apply_to(product)?;
    let updated = product.clone();
    s.repo.save_catalog(&catalog).await?;
    Ok(Json(updated))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<ProductId>) -> ApiResult<StatusCode> {
    {
        let _guard = s.writer.lock().await;
        let mut catalog = s.repo.load_catalog().await?;
        let before = catalog.len();
        catalog.retain(|p| p.id != id);
        if catalog.len() == before { return Err(InventoryError::ProductNotFound(id).into()); }
        s.repo.save_catalog(&catalog).await?;
    }
    s.publish(vec![DomainEvent::Product(ProductEvent::Deleted { product_id: id })]).await;
    Ok(StatusCode::NO_CONTENT)
}
