//! Storage abstraction for carts and stock lookups.
//!
//! Cart operations receive a store explicitly rather than reaching for an
//! ambient database session. [`postgres::PgStore`] is the production backend;
//! [`memory::MemoryStore`] backs the service tests.

pub mod memory;
pub mod postgres;

use std::future::Future;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{domain::Cart, Result};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence for carts and their items.
///
/// All methods return `Send` futures so implementations work inside a
/// multi-threaded async runtime.
pub trait CartStore: Send + Sync {
    /// The cart owned by an authenticated user, or `None`.
    fn find_cart_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = Result<Option<Cart>>> + Send + '_;

    /// A cart with its items, unit prices joined in, or `None`.
    fn find_cart(&self, cart_id: Uuid) -> impl Future<Output = Result<Option<Cart>>> + Send + '_;

    /// Allocates and persists a new empty cart. Fails with
    /// [`MarketError::CartConflict`](crate::MarketError::CartConflict) when the
    /// owner already has one.
    fn create_cart(
        &self,
        owner_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Cart>> + Send + '_;

    /// Persists the cart row and its full item set as one unit of work: lines
    /// present on `cart` are upserted, stored rows no longer present are
    /// deleted.
    fn save_cart<'a>(&'a self, cart: &'a Cart) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Removes a cart, cascading to its items.
    fn delete_cart(&self, cart_id: Uuid) -> impl Future<Output = Result<()>> + Send + '_;

    /// Persists `target` and deletes the absorbed cart in a single
    /// transaction, so a merge can never half-apply across the two carts.
    fn absorb_cart<'a>(
        &'a self,
        target: &'a Cart,
        absorbed_cart_id: Uuid,
    ) -> impl Future<Output = Result<()>> + Send + 'a;
}

/// Read-only stock lookup, consulted before any quantity change is committed.
pub trait InventoryOracle: Send + Sync {
    /// Available stock for a product, or `None` when the product is not in
    /// the active catalog.
    fn available_stock(
        &self,
        product_id: Uuid,
    ) -> impl Future<Output = Result<Option<Decimal>>> + Send + '_;
}
