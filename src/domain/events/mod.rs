//! Domain events
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::{PlateId, ProductId, ReservationId, SaleId};
use crate::domain::services::allocation::CostMode;
use crate::domain::value_objects::SizeKey;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Plate(PlateEvent),
    Reservation(ReservationEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: ProductId, name: String },
    Synthesized { product_id: ProductId, size_key: SizeKey },
    Deleted { product_id: ProductId },
    StockAdded { product_id: ProductId, quantity: i64, unit_cost: f64, new_cost: f64 },
    StockRemoved { product_id: ProductId, quantity: i64 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlateEvent {
    Created { plate_id: PlateId },
    Printed { plate_id: PlateId, mode: CostMode, total_quantity: u64 },
    Deleted { plate_id: PlateId },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationEvent {
    Created { reservation_id: ReservationId, product_id: ProductId },
    Completed { reservation_id: ReservationId, sale_id: SaleId },
    Cancelled { reservation_id: ReservationId },
}

impl DomainEvent {
    /// Subject the event is published on, e.g. `printshop.plate.printed`.
    pub fn subject(&self) -> String {
        let (aggregate, kind) = match self {
            DomainEvent::Product(e) => ("product", match e {
                ProductEvent::Created { .. } => "created",
                ProductEvent::Synthesized { .. } => "synthesized",
                ProductEvent::Deleted { .. } => "deleted",
                ProductEvent::StockAdded { .. } => "stock_added",
                ProductEvent::StockRemoved { .. } => "stock_removed",
            }),
            DomainEvent::Plate(e) => ("plate", match e {
                PlateEvent::Created { .. } => "created",
                PlateEvent::Printed { .. } => "printed",
                PlateEvent::Deleted { .. } => "deleted",
            }),
            DomainEvent::Reservation(e) => ("reservation", match e {
                ReservationEvent::Created { .. } => "created",
                ReservationEvent::Completed { .. } => "completed",
                ReservationEvent::Cancelled { .. } => "cancelled",
            }),
        };
        format!("printshop.{aggregate}.{kind}")
    }
}

/// Wire form of an event.
#[derive(Clone, Debug, Serialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self { id: Uuid::new_v4(), occurred_at: Utc::now(), event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_payload() {
        let event = DomainEvent::Plate(PlateEvent::Printed { plate_id: 3, mode: CostMode::Area, total_quantity: 150 });
        assert_eq!(event.subject(), "printshop.plate.printed");
        let json = serde_json::to_value(EventEnvelope::new(event)).unwrap();
        assert_eq!(json["event"]["plate"]["type"], "printed");
        assert_eq!(json["event"]["plate"]["mode"], "area");
    }
}
