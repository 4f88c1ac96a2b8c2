//! Domain model

pub mod cart;
pub mod catalog;
pub mod events;

pub use cart::{Cart, CartItem};
pub use catalog::{Artisan, Category, Product};
pub use events::CartEvent;
