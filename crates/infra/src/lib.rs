//! Infrastructure layer: persistence, backups, activity staging.

pub mod activity;
pub mod backup;
pub mod store;

pub use activity::ActivityLog;
pub use backup::BackupPlan;
pub use store::{
    in_memory::InMemoryStore, sqlite::SqliteStore, CatalogStore, CustomerStore, InvoiceStore,
    StoreError, StoreResult,
};
