//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A mutable collection of product/quantity lines owned by zero or one user.
///
/// Mutation happens in memory; a store backend persists the whole aggregate
/// afterwards. Validation against inventory is the service layer's job, so a
/// rejected request never reaches these mutators.
#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    pub id: Uuid,
    /// `None` for anonymous carts carried by the client across requests.
    pub owner_id: Option<Uuid>,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Fractional for weight-sold goods.
    pub quantity: Decimal,
    /// Unit price in minor currency units, joined in when the cart is loaded.
    /// `None` when the product is no longer in the active catalog.
    pub unit_price: Option<i64>,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.quantity * Decimal::from(self.unit_price.unwrap_or(0))
    }
}

impl Cart {
    pub fn new(owner_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_id,
            items: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reassigns the cart to an authenticated user.
    pub fn assign_owner(&mut self, owner_id: Uuid) {
        self.owner_id = Some(owner_id);
        self.touch();
    }

    /// Adds `quantity` of a product, folding into the existing line if one is
    /// present. Returns the resulting line. Unit prices are joined in by the
    /// store at load time; a fresh line has none yet.
    pub fn add_quantity(&mut self, product_id: Uuid, quantity: Decimal) -> CartItem {
        let item = match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => {
                existing.quantity += quantity;
                existing.clone()
            }
            None => {
                let item = CartItem {
                    id: Uuid::now_v7(),
                    product_id,
                    quantity,
                    unit_price: None,
                };
                self.items.push(item.clone());
                item
            }
        };
        self.touch();
        item
    }

    /// Sets a line's quantity; zero removes the line entirely. Returns `false`
    /// when the cart has no line for the product.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: Decimal) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return false;
        };
        if quantity.is_zero() {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            item.quantity = quantity;
        }
        self.touch();
        true
    }

    /// Returns `false` when the cart has no line for the product.
    pub fn remove_item(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Folds another cart's lines into this one: quantities of duplicate
    /// products are summed, the rest move over unchanged.
    pub fn absorb(&mut self, other: Cart) {
        for item in other.items {
            match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
                Some(existing) => existing.quantity += item.quantity,
                None => self.items.push(item),
            }
        }
        self.touch();
    }

    /// Cart total in minor currency units. A line whose product vanished from
    /// the catalog prices at zero rather than failing the whole cart.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn priced(product_id: Uuid, quantity: Decimal, unit_price: Option<i64>) -> CartItem {
        CartItem {
            id: Uuid::now_v7(),
            product_id,
            quantity,
            unit_price,
        }
    }

    #[test]
    fn add_quantity_folds_duplicate_product() {
        let mut cart = Cart::new(None);
        cart.add_quantity(pid(1), Decimal::new(2, 0));
        cart.add_quantity(pid(1), Decimal::new(1, 0));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.item(pid(1)).unwrap().quantity, Decimal::new(3, 0));
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let mut cart = Cart::new(None);
        cart.add_quantity(pid(1), Decimal::new(2, 0));
        assert!(cart.set_quantity(pid(1), Decimal::ZERO));
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_unknown_product_is_rejected() {
        let mut cart = Cart::new(None);
        assert!(!cart.set_quantity(pid(9), Decimal::new(1, 0)));
    }

    #[test]
    fn absorb_sums_duplicates_and_moves_the_rest() {
        let mut target = Cart::new(Some(pid(100)));
        target.add_quantity(pid(5), Decimal::new(3, 0));

        let mut source = Cart::new(None);
        source.add_quantity(pid(5), Decimal::new(2, 0));
        source.add_quantity(pid(7), Decimal::new(15, 1)); // 1.5kg

        target.absorb(source);
        assert_eq!(target.item_count(), 2);
        assert_eq!(target.item(pid(5)).unwrap().quantity, Decimal::new(5, 0));
        assert_eq!(target.item(pid(7)).unwrap().quantity, Decimal::new(15, 1));
    }

    #[test]
    fn total_sums_quantity_times_price() {
        let mut cart = Cart::new(None);
        cart.items.push(priced(pid(1), Decimal::new(2, 0), Some(2400)));
        cart.items.push(priced(pid(2), Decimal::new(5, 1), Some(1150))); // 0.5 x 1150
        assert_eq!(cart.total(), Decimal::new(5375, 0));
    }

    #[test]
    fn total_prices_vanished_products_at_zero() {
        let mut cart = Cart::new(None);
        cart.items.push(priced(pid(1), Decimal::new(2, 0), Some(2400)));
        cart.items.push(priced(pid(2), Decimal::new(4, 0), None));
        assert_eq!(cart.total(), Decimal::new(4800, 0));
    }
}
