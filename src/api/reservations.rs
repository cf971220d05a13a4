use axum::{extract::{Path, State}, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;
use crate::domain::aggregates::{next_id, ProductId, Reservation, ReservationError, ReservationId, Sale};
use crate::domain::events::{DomainEvent, ProductEvent, ReservationEvent};
use crate::domain::services::record_sale;
use crate::InventoryError;
use super::{ApiResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, max = 120))]
    pub customer_name: String,
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
    /// Defaults to list price times quantity.
    #[validate(range(min = 0.0))]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub deposit: f64,
}

pub async fn list_reservations(State(s): State<AppState>) -> ApiResult<Json<Vec<Reservation>>> {
    Ok(Json(s.repo.load_reservations().await?))
}

pub async fn create_reservation(State(s): State<AppState>, Json(r): Json<CreateReservationRequest>) -> ApiResult<(StatusCode, Json<Reservation>)> {
    r.validate()?;
    let reservation = {
        let _guard = s.writer.lock().await;
        let catalog = s.repo.load_catalog().await?;
        let mut reservations = s.repo.load_reservations().await?;
        let product = catalog.iter().find(|p| p.id == r.product_id).ok_or(InventoryError::ProductNotFound(r.product_id))?;
        let total_price = r.total_price.unwrap_or(product.price * f64::from(r.quantity));
        let id = next_id(reservations.iter().map(|x| x.id));
        let reservation = Reservation::create(id, r.customer_name, r.product_id, r.quantity, total_price, r.deposit, Utc::now())?;
        reservations.push(reservation.clone());
        s.repo.save_reservations(&reservations).await?;
        reservation
    };
    tracing::info!(reservation_id = reservation.id, balance_due = reservation.balance_due(), "created reservation");
    s.publish(vec![DomainEvent::Reservation(ReservationEvent::Created { reservation_id: reservation.id, product_id: reservation.product_id })]).await;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Turns the reservation into a sale at the reserved price.
pub async fn complete_reservation(State(s): State<AppState>, Path(id): Path<ReservationId>) -> ApiResult<Json<Reservation>> {
    let (reservation, sold) = {
        let _guard = s.writer.lock().await;
        let mut reservations = s.repo.load_reservations().await?;
        let mut catalog = s.repo.load_catalog().await?;
        let mut sales = s.repo.load_sales().await?;

        let reservation = reservations.iter_mut().find(|x| x.id == id).ok_or(ReservationError::NotFound(id))?;
        reservation.ensure_pending()?;
        let now = Utc::now();
        let sale = Sale::new(next_id(sales.iter().map(|x| x.id)), reservation.product_id, reservation.quantity, reservation.unit_price(), now)
            .for_reservation(id);
        let entry = record_sale(&mut catalog, &sale)?;
        reservation.complete(sale.id, now)?;
        let completed = reservation.clone();
        sales.push(sale);

        s.repo.save_catalog(&catalog).await?;
        s.repo.save_sales(&sales).await?;
        s.repo.save_reservations(&reservations).await?;
        (completed, entry)
    };
    tracing::info!(reservation_id = id, sale_id = ?reservation.sale_id, "completed reservation");
    let mut events = vec![DomainEvent::Product(ProductEvent::StockRemoved { product_id: sold.product_id, quantity: -sold.quantity })];
    if let Some(sale_id) = reservation.sale_id {
        events.push(DomainEvent::Reservation(ReservationEvent::Completed { reservation_id: id, sale_id }));
    }
    s.publish(events).await;
    Ok(Json(reservation))
}

pub async fn cancel_reservation(State(s): State<AppState>, Path(id): Path<ReservationId>) -> ApiResult<Json<Reservation>> {
    let reservation = {
        let _guard = s.writer.lock().await;
        let mut reservations = s.repo.load_reservations().await?;
        let reservation = reservations.iter_mut().find(|x| x.id == id).ok_or(ReservationError::NotFound(id))?;
        reservation.cancel(Utc::now())?;
        let cancelled = reservation.clone();
        s.repo.save_reservations(&reservations).await?;
        cancelled
    };
    tracing::info!(reservation_id = id, refundable_deposit = reservation.deposit, "cancelled reservation");
    s.publish(vec![DomainEvent::Reservation(ReservationEvent::Cancelled { reservation_id: id })]).await;
    Ok(Json(reservation))
}
