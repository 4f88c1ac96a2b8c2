//! [`PgStore`] - the PostgreSQL implementation of [`CartStore`] and
//! [`InventoryOracle`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    domain::{Cart, CartItem},
    store::{CartStore, InventoryOracle},
    MarketError, Result,
};

/// Cart persistence over a shared connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    owner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
    unit_price: Option<i64>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT ci.id, ci.product_id, ci.quantity, p.price AS unit_price
             FROM cart_items ci
             LEFT JOIN products p ON p.id = ci.product_id AND p.status = 'active'
             WHERE ci.cart_id = $1
             ORDER BY ci.created_at",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CartItem {
                id: r.id,
                product_id: r.product_id,
                quantity: r.quantity,
                unit_price: r.unit_price,
            })
            .collect())
    }

    async fn load_cart(&self, row: CartRow) -> Result<Cart> {
        let items = self.load_items(row.id).await?;
        Ok(Cart {
            id: row.id,
            owner_id: row.owner_id,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Writes the cart row and reconciles `cart_items` against the in-memory
    /// item set inside the caller's transaction.
    async fn persist(&self, tx: &mut Transaction<'_, Postgres>, cart: &Cart) -> Result<()> {
        sqlx::query("UPDATE carts SET owner_id = $2, updated_at = $3 WHERE id = $1")
            .bind(cart.id)
            .bind(cart.owner_id)
            .bind(cart.updated_at)
            .execute(&mut **tx)
            .await?;

        // Lines keep the id they were loaded with, so the primary key is the
        // upsert arbiter; the (cart_id, product_id) unique constraint still
        // rejects a concurrent writer sneaking in a duplicate line.
        for item in &cart.items {
            sqlx::query(
                "INSERT INTO cart_items (id, cart_id, product_id, quantity, created_at)
                 VALUES ($1, $2, $3, $4, NOW())
                 ON CONFLICT (id) DO UPDATE SET quantity = EXCLUDED.quantity",
            )
            .bind(item.id)
            .bind(cart.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut **tx)
            .await?;
        }

        let keep: Vec<Uuid> = cart.items.iter().map(|i| i.product_id).collect();
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id <> ALL($2)")
            .bind(cart.id)
            .bind(&keep)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl CartStore for PgStore {
    async fn find_cart_by_owner(&self, owner_id: Uuid) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_id, created_at, updated_at FROM carts WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_cart(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_cart(&self, cart_id: Uuid) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_id, created_at, updated_at FROM carts WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_cart(row).await?)),
            None => Ok(None),
        }
    }

    async fn create_cart(&self, owner_id: Option<Uuid>) -> Result<Cart> {
        let cart = Cart::new(owner_id);
        sqlx::query("INSERT INTO carts (id, owner_id, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(cart.id)
            .bind(cart.owner_id)
            .bind(cart.created_at)
            .bind(cart.updated_at)
            .execute(&self.pool)
            .await
            .map_err(owner_conflict)?;
        Ok(cart)
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.persist(&mut tx, cart).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_cart(&self, cart_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn absorb_cart(&self, target: &Cart, absorbed_cart_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        // The absorbed cart goes first: moved lines are re-inserted under
        // their original ids, which must no longer exist.
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(absorbed_cart_id)
            .execute(&mut *tx)
            .await?;
        self.persist(&mut tx, target).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl InventoryOracle for PgStore {
    async fn available_stock(&self, product_id: Uuid) -> Result<Option<Decimal>> {
        let stock: Option<(Decimal,)> =
            sqlx::query_as("SELECT stock FROM products WHERE id = $1 AND status = 'active'")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(stock.map(|(s,)| s))
    }
}

/// Maps a violation of the one-cart-per-owner index to [`MarketError::CartConflict`].
fn owner_conflict(e: sqlx::Error) -> MarketError {
    if e.as_database_error().and_then(|d| d.constraint()) == Some("ux_carts_owner") {
        MarketError::CartConflict
    } else {
        e.into()
    }
}
