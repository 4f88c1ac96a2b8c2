//! [`MemoryStore`] - a HashMap-backed store, useful for tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    domain::Cart,
    store::{CartStore, InventoryOracle},
    MarketError, Result,
};

#[derive(Clone, Copy)]
struct StockedProduct {
    price: i64,
    stock: Decimal,
}

#[derive(Default)]
struct Inner {
    carts: HashMap<Uuid, Cart>,
    products: HashMap<Uuid, StockedProduct>,
}

/// In-memory cart store and inventory oracle. Cloning shares the underlying
/// state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product with a unit price (minor units) and available stock.
    pub fn add_product(&self, product_id: Uuid, price: i64, stock: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .products
            .insert(product_id, StockedProduct { price, stock });
    }

    /// Drops a product from the catalog. Cart lines referencing it survive and
    /// load without a unit price.
    pub fn remove_product(&self, product_id: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        inner.products.remove(&product_id);
    }

    /// Clones a stored cart with current unit prices joined in, mirroring what
    /// the SQL backend's load query produces.
    fn snapshot(inner: &Inner, cart: &Cart) -> Cart {
        let mut cart = cart.clone();
        for item in &mut cart.items {
            item.unit_price = inner.products.get(&item.product_id).map(|p| p.price);
        }
        cart
    }
}

impl CartStore for MemoryStore {
    async fn find_cart_by_owner(&self, owner_id: Uuid) -> Result<Option<Cart>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .carts
            .values()
            .find(|c| c.owner_id == Some(owner_id))
            .map(|c| Self::snapshot(&inner, c)))
    }

    async fn find_cart(&self, cart_id: Uuid) -> Result<Option<Cart>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .carts
            .get(&cart_id)
            .map(|c| Self::snapshot(&inner, c)))
    }

    async fn create_cart(&self, owner_id: Option<Uuid>) -> Result<Cart> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(owner) = owner_id {
            if inner.carts.values().any(|c| c.owner_id == Some(owner)) {
                return Err(MarketError::CartConflict);
            }
        }
        let cart = Cart::new(owner_id);
        inner.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.carts.insert(cart.id, cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, cart_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.carts.remove(&cart_id);
        Ok(())
    }

    async fn absorb_cart(&self, target: &Cart, absorbed_cart_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.carts.remove(&absorbed_cart_id);
        inner.carts.insert(target.id, target.clone());
        Ok(())
    }
}

impl InventoryOracle for MemoryStore {
    async fn available_stock(&self, product_id: Uuid) -> Result<Option<Decimal>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.products.get(&product_id).map(|p| p.stock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_find_and_delete_cart() {
        let store = MemoryStore::new();
        let cart = store.create_cart(None).await.unwrap();

        let found = store.find_cart(cart.id).await.unwrap();
        assert!(found.is_some());

        store.delete_cart(cart.id).await.unwrap();
        assert!(store.find_cart(cart.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_cart_for_same_owner_is_rejected() {
        let store = MemoryStore::new();
        let owner = Uuid::from_u128(7);
        store.create_cart(Some(owner)).await.unwrap();

        let err = store.create_cart(Some(owner)).await.unwrap_err();
        assert!(matches!(err, MarketError::CartConflict));
    }

    #[tokio::test]
    async fn loaded_items_carry_current_prices() {
        let store = MemoryStore::new();
        let product = Uuid::from_u128(3);
        store.add_product(product, 2400, Decimal::new(10, 0));

        let mut cart = store.create_cart(None).await.unwrap();
        cart.add_quantity(product, Decimal::new(2, 0));
        store.save_cart(&cart).await.unwrap();

        let loaded = store.find_cart(cart.id).await.unwrap().unwrap();
        assert_eq!(loaded.item(product).unwrap().unit_price, Some(2400));

        store.remove_product(product);
        let loaded = store.find_cart(cart.id).await.unwrap().unwrap();
        assert_eq!(loaded.item(product).unwrap().unit_price, None);
    }

    #[tokio::test]
    async fn absorb_cart_persists_target_and_drops_absorbed() {
        let store = MemoryStore::new();
        let target = store.create_cart(Some(Uuid::from_u128(7))).await.unwrap();
        let absorbed = store.create_cart(None).await.unwrap();

        store.absorb_cart(&target, absorbed.id).await.unwrap();
        assert!(store.find_cart(target.id).await.unwrap().is_some());
        assert!(store.find_cart(absorbed.id).await.unwrap().is_none());
    }
}
