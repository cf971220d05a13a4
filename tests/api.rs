//! HTTP API tests driving the router in-process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use axum::{body::Body, http::{Request, StatusCode}, Router};
use serde_json::{json, Value};
use tower::ServiceExt;
use printshop_inventory::{api, CatalogStore, MemoryStore, Repository, StoreError, Table};

async fn app() -> Router {
    app_over(Arc::new(MemoryStore::new())).await
}

async fn app_over(store: Arc<dyn CatalogStore>) -> Router {
    let repo = Repository::new(store);
    repo.seed_catalog_if_empty().await.unwrap();
    api::router(api::AppState::new(repo, 18500.0))
}

/// Memory store whose products table can be made to reject writes.
#[derive(Default)]
struct ReadOnlyProducts {
    inner: MemoryStore,
    locked: AtomicBool,
}

#[async_trait]
impl CatalogStore for ReadOnlyProducts {
    async fn load_table(&self, table: Table) -> Result<Vec<Value>, StoreError> {
        self.inner.load_table(table).await
    }

    async fn replace_table(&self, table: Table, rows: Vec<Value>) -> Result<(), StoreError> {
        if table == Table::Products && self.locked.load(Ordering::SeqCst) {
            return Err(StoreError::Io { table, source: std::io::Error::new(std::io::ErrorKind::Other, "disk full") });
        }
        self.inner.replace_table(table, rows).await
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn product<'a>(products: &'a Value, name: &str) -> &'a Value {
    products.as_array().unwrap().iter().find(|p| p["name"] == name).unwrap()
}

#[tokio::test]
async fn health() {
    let (status, body) = send(&app().await, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn plate_print_flow() {
    let app = app().await;
    let (status, plate) = send(&app, "POST", "/api/v1/plates", Some(json!({
        "name": "Plate 1",
        "stickers_quantities": {"chico": 100, "grande": 50}
    })))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plate["cost"], 18500.0);
    assert_eq!(plate["is_printed"], false);
    let id = plate["id"].as_u64().unwrap();

    let (status, preview) = send(&app, "GET", &format!("/api/v1/plates/{id}/preview"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["allocation"]["mode"], "area");
    assert!((preview["allocated_cost"].as_f64().unwrap() - 18500.0).abs() < 1e-6);

    let (status, printed) = send(&app, "POST", &format!("/api/v1/plates/{id}/print"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(printed["plate"]["is_printed"], true);
    assert_eq!(printed["entries"].as_array().unwrap().len(), 2);

    let (_, products) = send(&app, "GET", "/api/v1/products", None).await;
    let chico = product(&products, "Sticker Chico");
    assert_eq!(chico["stock"], 100);
    assert!((chico["cost"].as_f64().unwrap() - 61.67).abs() < 0.01);
    assert_eq!(product(&products, "Sticker Grande")["stock"], 50);

    let (status, _) = send(&app, "POST", &format!("/api/v1/plates/{id}/print"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/plates/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // stock unchanged by the rejected reprint
    let (_, products) = send(&app, "GET", "/api/v1/products", None).await;
    assert_eq!(product(&products, "Sticker Chico")["stock"], 100);
}

#[tokio::test]
async fn printing_unbound_size_creates_product() {
    let app = app().await;
    let (_, plate) = send(&app, "POST", "/api/v1/plates", Some(json!({
        "name": "Custom", "cost": 2800.0, "stickers_quantities": {"70x40": 10}
    })))
    .await;
    let id = plate["id"].as_u64().unwrap();

    let (status, printed) = send(&app, "POST", &format!("/api/v1/plates/{id}/print"), None).await;
    assert_eq!(status, StatusCode::OK);
    let created = &printed["created_products"][0];
    assert_eq!(created["name"], "Sticker 70x40");
    assert_eq!(created["id"], 5);
    assert_eq!(created["area_mm2"], 2800.0);
    assert_eq!(created["stock"], 10);
    assert_eq!(created["cost"], 280.0);
}

#[tokio::test]
async fn failed_catalog_write_does_not_double_print() {
    let store = Arc::new(ReadOnlyProducts::default());
    let app = app_over(store.clone()).await;
    let (_, plate) = send(&app, "POST", "/api/v1/plates", Some(json!({"name": "P", "cost": 1000.0, "stickers_quantities": {"chico": 10}}))).await;
    let id = plate["id"].as_u64().unwrap();

    store.locked.store(true, Ordering::SeqCst);
    let (status, _) = send(&app, "POST", &format!("/api/v1/plates/{id}/print"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    store.locked.store(false, Ordering::SeqCst);
    let (status, _) = send(&app, "POST", &format!("/api/v1/plates/{id}/print"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, chico) = send(&app, "GET", "/api/v1/products/3", None).await;
    assert_eq!(chico["stock"], 0);
}

#[tokio::test]
async fn plate_quantities_that_overflow_are_rejected() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/api/v1/plates", Some(json!({
        "name": "Too many", "stickers_quantities": {" chico": u32::MAX, "chico ": 1}
    })))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid quantity");
    let (_, plates) = send(&app, "GET", "/api/v1/plates", None).await;
    assert_eq!(plates, json!([]));
}

#[tokio::test]
async fn pending_plate_can_be_deleted() {
    let app = app().await;
    let (_, plate) = send(&app, "POST", "/api/v1/plates", Some(json!({"name": "Draft", "small_stickers_quantity": 5}))).await;
    assert_eq!(plate["stickers_quantities"]["chico"], 5);
    let id = plate["id"].as_u64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/plates/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/v1/plates/{id}/preview"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn purchases_and_sales_move_stock() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/api/v1/purchases", Some(json!({"product_id": 1, "quantity": 10, "unit_cost": 8000.0}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["new_cost"], 8000.0);

    send(&app, "POST", "/api/v1/purchases", Some(json!({"product_id": 1, "quantity": 30, "unit_cost": 12000.0}))).await;
    let (_, shirt) = send(&app, "GET", "/api/v1/products/1", None).await;
    assert_eq!(shirt["stock"], 40);
    assert_eq!(shirt["cost"], 11000.0);

    let (status, sale) = send(&app, "POST", "/api/v1/sales", Some(json!({"product_id": 1, "quantity": 3}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["record"]["unit_price"], 15000.0);
    assert_eq!(sale["entry"]["new_stock"], 37);
    assert_eq!(sale["entry"]["new_cost"], 11000.0);

    let (status, _) = send(&app, "POST", "/api/v1/sales", Some(json!({"product_id": 99, "quantity": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", "/api/v1/purchases", Some(json!({"product_id": 1, "quantity": 0, "unit_cost": 1.0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn reservation_lifecycle() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/api/v1/reservations", Some(json!({
        "customer_name": "Ana", "product_id": 2, "quantity": 2, "deposit": 20000.0
    })))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, reservation) = send(&app, "POST", "/api/v1/reservations", Some(json!({
        "customer_name": "Ana", "product_id": 2, "quantity": 2, "deposit": 5000.0
    })))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["total_price"], 18000.0);
    assert_eq!(reservation["status"], "pending");
    let id = reservation["id"].as_u64().unwrap();

    let (status, completed) = send(&app, "POST", &format!("/api/v1/reservations/{id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["sale_id"], 1);

    let (_, tote) = send(&app, "GET", "/api/v1/products/2", None).await;
    assert_eq!(tote["stock"], -2);
    let (_, sales) = send(&app, "GET", "/api/v1/sales", None).await;
    assert_eq!(sales[0]["reservation_id"], id);

    let (status, _) = send(&app, "POST", &format!("/api/v1/reservations/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn product_crud() {
    let app = app().await;
    let (status, created) = send(&app, "POST", "/api/v1/products", Some(json!({
        "name": "Sticker Holo", "category": "sticker", "price": 800.0, "size": "holo", "width_mm": 60.0, "height_mm": 60.0
    })))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 5);
    assert_eq!(created["stock"], 0);

    let (status, updated) = send(&app, "PUT", "/api/v1/products/5", Some(json!({
        "name": "Sticker Holo", "category": "sticker", "price": 950.0, "size": "holo"
    })))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 950.0);
    assert!(updated.get("width_mm").is_none());

    let (status, _) = send(&app, "POST", "/api/v1/products", Some(json!({"name": "", "category": "tote", "price": 1.0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "DELETE", "/api/v1/products/5", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/v1/products/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
