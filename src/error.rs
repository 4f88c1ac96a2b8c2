//! Error taxonomy shared by the store, service, and API layers.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Artisan not found")]
    ArtisanNotFound,

    #[error("Cart not found")]
    CartNotFound,

    #[error("Cart item not found")]
    ItemNotFound,

    #[error("Insufficient stock: {available} available")]
    InsufficientStock { available: Decimal },

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("An authenticated owner is required")]
    Unauthorized,

    #[error("Owner already has a cart")]
    CartConflict,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl MarketError {
    /// Stable machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProductNotFound => "product_not_found",
            Self::CategoryNotFound => "category_not_found",
            Self::ArtisanNotFound => "artisan_not_found",
            Self::CartNotFound => "cart_not_found",
            Self::ItemNotFound => "item_not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::InvalidQuantity => "invalid_quantity",
            Self::Unauthorized => "unauthorized",
            Self::CartConflict => "cart_conflict",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<sqlx::Error> for MarketError {
    fn from(e: sqlx::Error) -> Self {
        MarketError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
