//! Catalog (inventory) items.
//!
//! Item names are unique case-insensitively; the SKU is assigned from a store
//! sequence. Items feed the bill editor with price and tax defaults.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pressbill_core::{DomainError, DomainResult, Entity, ItemId};

/// Auto-assigned stock-keeping unit, e.g. `ITM-00042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("ITM-{seq:05}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price and tax defaults handed to the bill editor when an item name is
/// typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDefaults {
    pub unit_price: Decimal,
    pub tax_percent: Decimal,
}

/// Entity: catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub sku: Sku,
    pub name: String,
    /// Harmonized System of Nomenclature code, when known.
    pub hsn: Option<String>,
    pub unit_price: Decimal,
    /// Stock on hand. Informational; bills do not decrement it.
    pub stock: Decimal,
    pub tax_percent: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogItem {
    pub fn new(
        id: ItemId,
        sku_seq: u64,
        name: impl Into<String>,
        hsn: Option<String>,
        unit_price: Decimal,
        stock: Decimal,
        tax_percent: Decimal,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        if stock < Decimal::ZERO {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        if tax_percent < Decimal::ZERO {
            return Err(DomainError::validation("tax percent cannot be negative"));
        }

        Ok(Self {
            id,
            sku: Sku::from_seq(sku_seq),
            name,
            hsn,
            unit_price,
            stock,
            tax_percent,
            created_at,
        })
    }

    /// Zero-priced stand-in for a description typed on a bill that matches no
    /// existing item. The rate comes from the bill line itself.
    pub fn placeholder(
        id: ItemId,
        sku_seq: u64,
        name: impl Into<String>,
        unit_price: Decimal,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::new(
            id,
            sku_seq,
            name,
            None,
            unit_price,
            Decimal::ZERO,
            Decimal::ZERO,
            created_at,
        )
    }

    pub fn line_defaults(&self) -> LineDefaults {
        LineDefaults {
            unit_price: self.unit_price,
            tax_percent: self.tax_percent,
        }
    }

    /// Case-insensitive substring match over name and SKU.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q) || self.sku.as_str().to_lowercase().contains(&q)
    }
}
