//! Human-readable invoice numbers: `{prefix}-{DDMMYY}-{seq:05}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pressbill_core::{DomainError, DomainResult};

/// Opaque, validated invoice number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Build a number from the configured prefix, issue date and a
    /// store-provided sequence value.
    pub fn generate(prefix: &str, date: NaiveDate, seq: u64) -> DomainResult<Self> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(DomainError::validation("invoice number prefix cannot be empty"));
        }
        if prefix.contains('-') {
            return Err(DomainError::validation(
                "invoice number prefix cannot contain '-'",
            ));
        }
        Ok(Self(format!("{}-{}-{:05}", prefix, date.format("%d%m%y"), seq)))
    }

    /// Accept an externally supplied number, with shape validation only.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let parts: Vec<&str> = value.split('-').collect();
        let ok = parts.len() == 3
            && !parts[0].is_empty()
            && parts[1].len() == 6
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && !parts[2].is_empty()
            && parts[2].chars().all(|c| c.is_ascii_digit());
        if !ok {
            return Err(DomainError::invalid_id(format!(
                "invoice number {value:?} does not match PREFIX-DDMMYY-NNNNN"
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
