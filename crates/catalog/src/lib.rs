//! `pressbill-catalog` — inventory items and pricing defaults.

pub mod item;

pub use item::{CatalogItem, LineDefaults, Sku};
