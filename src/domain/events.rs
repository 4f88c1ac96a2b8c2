//! Domain events

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Published on the message bus after a cart mutation commits.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { cart_id: Uuid, product_id: Uuid, quantity: Decimal },
    QuantityChanged { cart_id: Uuid, product_id: Uuid, quantity: Decimal },
    ItemRemoved { cart_id: Uuid, product_id: Uuid },
    Merged { cart_id: Uuid, absorbed_cart_id: Uuid, owner_id: Uuid },
}

impl CartEvent {
    /// NATS subject cart events are published on.
    pub const SUBJECT: &'static str = "artisan_market.cart";
}
