//! HTTP API.
//!
//! Handlers are the caller the domain expects: they load whole tables,
//! run the domain operation on the snapshot and write the tables back.
//! Every mutating handler holds [`AppState::writer`] for that whole
//! sequence, so concurrent requests can't overwrite each other's tables.

use std::sync::Arc;
use axum::{http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}, Json, Router};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};
use crate::domain::aggregates::{PlateError, ReservationError};
use crate::domain::events::{DomainEvent, EventEnvelope};
use crate::store::{Repository, StoreError};
use crate::InventoryError;

mod plates;
mod products;
mod reservations;
mod stock;

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub nats: Option<async_nats::Client>,
    pub writer: Arc<Mutex<()>>,
    pub default_plate_cost: f64,
}

impl AppState {
    pub fn new(repo: Repository, default_plate_cost: f64) -> Self {
        Self { repo, nats: None, writer: Arc::new(Mutex::new(())), default_plate_cost }
    }

    pub fn with_nats(mut self, client: async_nats::Client) -> Self {
        self.nats = Some(client);
        self
    }

    /// Best effort: a failed publish is logged and otherwise ignored.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(client) = &self.nats else { return };
        for event in events {
            let subject = event.subject();
            let payload = match serde_json::to_vec(&EventEnvelope::new(event)) {
                Ok(payload) => payload,
                Err(e) => { warn!(%subject, error = %e, "failed to encode event"); continue; }
            };
            if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                warn!(%subject, error = %e, "failed to publish event");
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "printshop-inventory"})) }))
        .route("/api/v1/products", get(products::list_products).post(products::create_product))
        .route("/api/v1/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/api/v1/plates", get(plates::list_plates).post(plates::create_plate))
        .route("/api/v1/plates/:id", get(plates::get_plate).delete(plates::delete_plate))
        .route("/api/v1/plates/:id/preview", get(plates::preview_plate))
        .route("/api/v1/plates/:id/print", post(plates::print_plate))
        .route("/api/v1/purchases", get(stock::list_purchases).post(stock::create_purchase))
        .route("/api/v1/sales", get(stock::list_sales).post(stock::create_sale))
        .route("/api/v1/reservations", get(reservations::list_reservations).post(reservations::create_reservation))
        .route("/api/v1/reservations/:id/complete", post(reservations::complete_reservation))
        .route("/api/v1/reservations/:id/cancel", post(reservations::cancel_reservation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self { Self::Inventory(e.into()) }
}

impl From<PlateError> for ApiError {
    fn from(e: PlateError) -> Self { Self::Inventory(e.into()) }
}

impl From<ReservationError> for ApiError {
    fn from(e: ReservationError) -> Self { Self::Inventory(e.into()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inventory(e) => match e {
                InventoryError::ProductNotFound(_)
                | InventoryError::Plate(PlateError::NotFound(_))
                | InventoryError::Reservation(ReservationError::NotFound(_)) => StatusCode::NOT_FOUND,
                InventoryError::Plate(PlateError::AlreadyPrinted(_))
                | InventoryError::Reservation(ReservationError::Closed { .. }) => StatusCode::CONFLICT,
                InventoryError::Reservation(_) | InventoryError::InvalidQuantity | InventoryError::InvalidSizeKey(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                InventoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
