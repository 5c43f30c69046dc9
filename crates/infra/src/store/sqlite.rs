//! SQLite-backed store.
//!
//! Rows keep a few filter columns (unique keys, timestamps) next to a JSON
//! `doc` column holding the full serialized domain value, so schema changes in
//! the domain layer do not require migrations for every field. Sequences live
//! in a `counters` table bumped with an UPSERT.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use pressbill_billing::Invoice;
use pressbill_catalog::CatalogItem;
use pressbill_core::{CustomerId, Entity, ItemId};
use pressbill_parties::Customer;

use super::{CatalogStore, CustomerStore, InvoiceStore, StoreError, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS customers (
    id         TEXT PRIMARY KEY,
    phone      TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    doc        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS items (
    id         TEXT PRIMARY KEY,
    name_lower TEXT NOT NULL UNIQUE,
    doc        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS invoices (
    id         TEXT PRIMARY KEY,
    number     TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    deleted    INTEGER NOT NULL DEFAULT 0,
    doc        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS counters (
    name  TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file and ensure the schema.
    pub async fn connect(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn next_seq(&self, name: &str) -> StoreResult<u64> {
        let row = sqlx::query(
            "INSERT INTO counters (name, value) VALUES (?, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1
             RETURNING value",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        let value: i64 = row.try_get("value")?;
        Ok(value as u64)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::corrupt(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(doc: &str) -> StoreResult<T> {
    serde_json::from_str(doc).map_err(|e| StoreError::corrupt(e.to_string()))
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(format!("{what} already exists")),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CustomerStore for SqliteStore {
    async fn insert(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query("INSERT INTO customers (id, phone, created_at, doc) VALUES (?, ?, ?, ?)")
            .bind(customer.id.to_string())
            .bind(&customer.phone)
            .bind(customer.created_at.to_rfc3339())
            .bind(encode(customer)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &format!("customer with phone {}", customer.phone)))?;
        Ok(())
    }

    async fn get(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let row = sqlx::query("SELECT doc FROM customers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode(r.try_get::<String, _>("doc")?.as_str()))
            .transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>> {
        let row = sqlx::query("SELECT doc FROM customers WHERE phone = ?")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode(r.try_get::<String, _>("doc")?.as_str()))
            .transpose()
    }

    async fn search(&self, query: Option<&str>, limit: u32) -> StoreResult<Vec<Customer>> {
        // Query matching mirrors the in-memory store: decode, then filter in
        // Rust, so both backends match on the same fields.
        let rows = sqlx::query("SELECT doc FROM customers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        let mut hits = Vec::new();
        for row in rows {
            let customer: Customer = decode(row.try_get::<String, _>("doc")?.as_str())?;
            if query.is_none_or(|q| customer.matches_query(q)) {
                hits.push(customer);
                if hits.len() == limit as usize {
                    break;
                }
            }
        }
        Ok(hits)
    }

    async fn next_reference_seq(&self) -> StoreResult<u64> {
        self.next_seq("customer_reference").await
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn insert(&self, item: &CatalogItem) -> StoreResult<()> {
        sqlx::query("INSERT INTO items (id, name_lower, doc) VALUES (?, ?, ?)")
            .bind(item.id.to_string())
            .bind(item.name.to_lowercase())
            .bind(encode(item)?)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &format!("item named {:?}", item.name)))?;
        Ok(())
    }

    async fn get(&self, id: ItemId) -> StoreResult<Option<CatalogItem>> {
        let row = sqlx::query("SELECT doc FROM items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode(r.try_get::<String, _>("doc")?.as_str()))
            .transpose()
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<CatalogItem>> {
        let row = sqlx::query("SELECT doc FROM items WHERE name_lower = ?")
            .bind(name.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode(r.try_get::<String, _>("doc")?.as_str()))
            .transpose()
    }

    async fn search(&self, query: Option<&str>) -> StoreResult<Vec<CatalogItem>> {
        let rows = sqlx::query("SELECT doc FROM items ORDER BY name_lower ASC")
            .fetch_all(&self.pool)
            .await?;
        let mut hits = Vec::new();
        for row in rows {
            let item: CatalogItem = decode(row.try_get::<String, _>("doc")?.as_str())?;
            if query.is_none_or(|q| item.matches_query(q)) {
                hits.push(item);
            }
        }
        Ok(hits)
    }

    async fn next_sku_seq(&self) -> StoreResult<u64> {
        self.next_seq("item_sku").await
    }
}

#[async_trait]
impl InvoiceStore for SqliteStore {
    async fn insert(&self, invoice: &Invoice) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO invoices (id, number, created_at, deleted, doc) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(invoice.id().to_string())
        .bind(invoice.number().as_str())
        .bind(invoice.created_at().to_rfc3339())
        .bind(invoice.is_deleted() as i64)
        .bind(encode(invoice)?)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &format!("invoice {}", invoice.number())))?;
        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE invoices SET created_at = ?, deleted = ?, doc = ? WHERE number = ?",
        )
        .bind(invoice.created_at().to_rfc3339())
        .bind(invoice.is_deleted() as i64)
        .bind(encode(invoice)?)
        .bind(invoice.number().as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_by_number(&self, number: &str) -> StoreResult<Option<Invoice>> {
        let row = sqlx::query("SELECT doc FROM invoices WHERE number = ?")
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| decode(r.try_get::<String, _>("doc")?.as_str()))
            .transpose()
    }

    async fn list(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<Invoice>> {
        let rows = sqlx::query("SELECT doc FROM invoices WHERE deleted = 0")
            .fetch_all(&self.pool)
            .await?;
        let mut hits = Vec::new();
        for row in rows {
            let invoice: Invoice = decode(row.try_get::<String, _>("doc")?.as_str())?;
            if range.is_none_or(|(start, end)| {
                invoice.created_at() >= start && invoice.created_at() <= end
            }) {
                hits.push(invoice);
            }
        }
        hits.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(hits)
    }

    async fn next_invoice_seq(&self) -> StoreResult<u64> {
        self.next_seq("invoice_number").await
    }
}
