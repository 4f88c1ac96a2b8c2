//! Cart endpoints.
//!
//! The owner id in request bodies arrives pre-resolved by the auth gateway in
//! front of this service; it is treated as a plain verified value here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{publish_event, AppState},
    domain::{Cart, CartEvent, CartItem},
    service::CartWithTotal,
    MarketError,
};

#[derive(Debug, Deserialize)]
pub struct CreateCartRequest {
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
}

impl From<CartItem> for ItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

pub async fn create_or_get(
    State(s): State<AppState>,
    Json(r): Json<CreateCartRequest>,
) -> Result<Json<Cart>, MarketError> {
    let cart = s.carts.create_or_get_cart(r.owner_id).await?;
    Ok(Json(cart))
}

pub async fn get_cart(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CartWithTotal>, MarketError> {
    let cart = s.carts.cart_with_total(id).await?;
    Ok(Json(cart))
}

pub async fn add_item(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), MarketError> {
    let item = s.carts.add_item(id, r.product_id, r.quantity).await?;
    publish_event(
        &s,
        &CartEvent::ItemAdded {
            cart_id: id,
            product_id: item.product_id,
            quantity: item.quantity,
        },
    )
    .await;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn set_quantity(
    State(s): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
    Json(r): Json<SetQuantityRequest>,
) -> Result<StatusCode, MarketError> {
    s.carts.set_item_quantity(id, product_id, r.quantity).await?;
    let event = if r.quantity.is_zero() {
        CartEvent::ItemRemoved { cart_id: id, product_id }
    } else {
        CartEvent::QuantityChanged { cart_id: id, product_id, quantity: r.quantity }
    };
    publish_event(&s, &event).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_item(
    State(s): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, MarketError> {
    s.carts.remove_item(id, product_id).await?;
    publish_event(&s, &CartEvent::ItemRemoved { cart_id: id, product_id }).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn merge(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<MergeRequest>,
) -> Result<Json<Cart>, MarketError> {
    let cart = s.carts.merge_carts(id, r.owner_id).await?;
    if let Some(owner_id) = cart.owner_id {
        publish_event(
            &s,
            &CartEvent::Merged {
                cart_id: cart.id,
                absorbed_cart_id: id,
                owner_id,
            },
        )
        .await;
    }
    Ok(Json(cart))
}
