//! REST surface: catalog CRUD and the cart endpoints.

pub mod carts;
pub mod catalog;
pub mod error;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{domain::CartEvent, service::CartService, store::PgStore};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub carts: CartService<PgStore>,
    pub nats: Option<async_nats::Client>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "artisan-market"})) }),
        )
        .route("/api/v1/products", get(catalog::list_products).post(catalog::create_product))
        .route(
            "/api/v1/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route("/api/v1/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/v1/categories/:id", get(catalog::get_category))
        .route("/api/v1/artisans", get(catalog::list_artisans).post(catalog::create_artisan))
        .route("/api/v1/artisans/:id", get(catalog::get_artisan))
        .route("/api/v1/carts", post(carts::create_or_get))
        .route("/api/v1/carts/:id", get(carts::get_cart))
        .route("/api/v1/carts/:id/items", post(carts::add_item))
        .route(
            "/api/v1/carts/:id/items/:product_id",
            put(carts::set_quantity).delete(carts::remove_item),
        )
        .route("/api/v1/carts/:id/merge", post(carts::merge))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Best-effort publish; cart mutations never fail because the bus is down.
pub(crate) async fn publish_event(state: &AppState, event: &CartEvent) {
    let Some(nats) = &state.nats else { return };
    match serde_json::to_vec(event) {
        Ok(payload) => {
            if let Err(e) = nats.publish(CartEvent::SUBJECT, payload.into()).await {
                tracing::warn!("failed to publish cart event: {e}");
            }
        }
        Err(e) => tracing::warn!("failed to serialize cart event: {e}"),
    }
}
