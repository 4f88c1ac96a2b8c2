//! Cart operations: create-or-get, add item, set quantity, remove, merge.
//!
//! Every operation runs load -> validate -> mutate -> persist, with all
//! validation done before any stored state changes. The store and inventory
//! oracle are injected, so the same code drives PostgreSQL in production and
//! the in-memory backend in tests.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{Cart, CartItem},
    store::{CartStore, InventoryOracle},
    MarketError, Result,
};

/// A cart together with its computed total, in minor currency units.
#[derive(Debug, Clone, Serialize)]
pub struct CartWithTotal {
    pub cart: Cart,
    pub total: Decimal,
}

#[derive(Clone)]
pub struct CartService<S> {
    store: S,
}

impl<S: CartStore + InventoryOracle> CartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the owner's existing cart, or creates a new one. Anonymous
    /// callers always get a fresh cart. Idempotent per owner.
    pub async fn create_or_get_cart(&self, owner_id: Option<Uuid>) -> Result<Cart> {
        if let Some(owner) = owner_id {
            if let Some(cart) = self.store.find_cart_by_owner(owner).await? {
                return Ok(cart);
            }
        }
        self.store.create_cart(owner_id).await
    }

    pub async fn cart_with_total(&self, cart_id: Uuid) -> Result<CartWithTotal> {
        let cart = self
            .store
            .find_cart(cart_id)
            .await?
            .ok_or(MarketError::CartNotFound)?;
        let total = cart.total();
        Ok(CartWithTotal { cart, total })
    }

    /// Adds `quantity` of a product to the cart, folding into an existing
    /// line. The combined quantity must fit within available stock; a
    /// rejection leaves the stored line untouched.
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
    ) -> Result<CartItem> {
        if quantity <= Decimal::ZERO {
            return Err(MarketError::InvalidQuantity);
        }
        let mut cart = self
            .store
            .find_cart(cart_id)
            .await?
            .ok_or(MarketError::CartNotFound)?;
        let available = self
            .store
            .available_stock(product_id)
            .await?
            .ok_or(MarketError::ProductNotFound)?;

        let requested = match cart.item(product_id) {
            Some(existing) => existing.quantity + quantity,
            None => quantity,
        };
        if requested > available {
            return Err(MarketError::InsufficientStock { available });
        }

        let item = cart.add_quantity(product_id, quantity);
        self.store.save_cart(&cart).await?;
        Ok(item)
    }

    /// Sets a line's quantity; zero deletes the line, which makes it
    /// equivalent to [`remove_item`](Self::remove_item).
    pub async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
    ) -> Result<()> {
        if quantity < Decimal::ZERO {
            return Err(MarketError::InvalidQuantity);
        }
        let mut cart = self
            .store
            .find_cart(cart_id)
            .await?
            .ok_or(MarketError::CartNotFound)?;
        if cart.item(product_id).is_none() {
            return Err(MarketError::ItemNotFound);
        }

        if !quantity.is_zero() {
            let available = self
                .store
                .available_stock(product_id)
                .await?
                .ok_or(MarketError::ProductNotFound)?;
            if quantity > available {
                return Err(MarketError::InsufficientStock { available });
            }
        }

        cart.set_quantity(product_id, quantity);
        self.store.save_cart(&cart).await
    }

    pub async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> Result<()> {
        let mut cart = self
            .store
            .find_cart(cart_id)
            .await?
            .ok_or(MarketError::CartNotFound)?;
        if !cart.remove_item(product_id) {
            return Err(MarketError::ItemNotFound);
        }
        self.store.save_cart(&cart).await
    }

    /// Merges an anonymous cart into the authenticated owner's cart at login.
    ///
    /// When the owner has no cart yet, the anonymous cart record is reassigned
    /// rather than copied. Otherwise duplicate products sum their quantities,
    /// remaining lines move over, and the emptied anonymous cart is deleted in
    /// the same transaction. Combined quantities are not re-checked against
    /// stock; the next quantity change on the merged line re-validates.
    pub async fn merge_carts(
        &self,
        anonymous_cart_id: Uuid,
        owner_id: Option<Uuid>,
    ) -> Result<Cart> {
        let owner_id = owner_id.ok_or(MarketError::Unauthorized)?;
        let anon = self
            .store
            .find_cart(anonymous_cart_id)
            .await?
            .ok_or(MarketError::CartNotFound)?;
        if anon.owner_id.is_some() {
            return Err(MarketError::CartNotFound);
        }

        match self.store.find_cart_by_owner(owner_id).await? {
            None => {
                let mut cart = anon;
                cart.assign_owner(owner_id);
                self.store.save_cart(&cart).await?;
                Ok(cart)
            }
            Some(mut target) => {
                let absorbed_id = anon.id;
                target.absorb(anon);
                self.store.absorb_cart(&target, absorbed_id).await?;
                Ok(target)
            }
        }
    }
}
