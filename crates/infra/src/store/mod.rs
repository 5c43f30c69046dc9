//! Store traits + error model.
//!
//! Two implementations: [`in_memory::InMemoryStore`] (tests, default when no
//! DB path is configured) and [`sqlite::SqliteStore`] (production). Stores are
//! deliberately dumb — filtering/sorting beyond simple lookups happens in the
//! service layer so both backends behave identically.

pub mod in_memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use pressbill_billing::Invoice;
use pressbill_catalog::CatalogItem;
use pressbill_core::{CustomerId, ItemId};
use pressbill_parties::Customer;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record could not be decoded back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert(&self, customer: &Customer) -> StoreResult<()>;
    async fn get(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    async fn find_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>>;
    /// Most recent first; `query` filters by name/phone/company substring.
    async fn search(&self, query: Option<&str>, limit: u32) -> StoreResult<Vec<Customer>>;
    /// Next value of the generated-reference sequence.
    async fn next_reference_seq(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, item: &CatalogItem) -> StoreResult<()>;
    async fn get(&self, id: ItemId) -> StoreResult<Option<CatalogItem>>;
    /// Case-insensitive exact name lookup.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<CatalogItem>>;
    /// Alphabetical by name; `query` filters by name/SKU substring.
    async fn search(&self, query: Option<&str>) -> StoreResult<Vec<CatalogItem>>;
    /// Next value of the SKU sequence.
    async fn next_sku_seq(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn insert(&self, invoice: &Invoice) -> StoreResult<()>;
    /// Replace the stored invoice with the same id.
    async fn update(&self, invoice: &Invoice) -> StoreResult<()>;
    async fn find_by_number(&self, number: &str) -> StoreResult<Option<Invoice>>;
    /// Non-deleted invoices, newest first, optionally restricted to a
    /// creation-time range (inclusive).
    async fn list(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<Invoice>>;
    /// Next value of the invoice-number sequence.
    async fn next_invoice_seq(&self) -> StoreResult<u64>;
}
