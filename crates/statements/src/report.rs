//! Statement aggregation over finalized, non-deleted invoices.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::DateRange;

/// One invoice row as the statement engine sees it (customer already joined).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub number: String,
    pub created_at: DateTime<Utc>,
    pub company: Option<String>,
    pub phone: String,
    pub total: Decimal,
}

/// Count + amount pair used by every rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollup {
    pub count: u64,
    pub amount: Decimal,
}

impl Rollup {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.amount += amount;
    }
}

/// Label used when an invoice's customer has no company set.
pub fn company_label(company: Option<&str>) -> String {
    match company.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => "(No Company)".to_string(),
    }
}

/// Aggregated statement for one resolved period.
///
/// BTreeMaps keep rollup ordering deterministic for rendering and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementReport {
    pub range: DateRange,
    pub invoice_count: u64,
    pub total_amount: Decimal,
    pub per_company: BTreeMap<String, Rollup>,
    pub per_day: BTreeMap<String, Rollup>,
    pub per_month: BTreeMap<String, Rollup>,
    pub rows: Vec<InvoiceSummary>,
}

impl StatementReport {
    /// Aggregate the rows of one period. Rows are assumed pre-filtered to the
    /// range and to non-deleted invoices; ordering is preserved.
    pub fn build(range: DateRange, rows: Vec<InvoiceSummary>) -> Self {
        let mut per_company: BTreeMap<String, Rollup> = BTreeMap::new();
        let mut per_day: BTreeMap<String, Rollup> = BTreeMap::new();
        let mut per_month: BTreeMap<String, Rollup> = BTreeMap::new();
        let mut total_amount = Decimal::ZERO;

        for row in &rows {
            total_amount += row.total;
            per_company
                .entry(company_label(row.company.as_deref()))
                .or_default()
                .add(row.total);
            per_day
                .entry(row.created_at.format("%Y-%m-%d").to_string())
                .or_default()
                .add(row.total);
            per_month
                .entry(row.created_at.format("%Y-%m").to_string())
                .or_default()
                .add(row.total);
        }

        Self {
            range,
            invoice_count: rows.len() as u64,
            total_amount,
            per_company,
            per_day,
            per_month,
            rows,
        }
    }

    /// Page of raw rows; `page` is 1-based, `per_page` clamped to 1..=500.
    pub fn page(&self, page: u32, per_page: u32) -> (&[InvoiceSummary], u32, u32) {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 500);
        let start = ((page - 1) as usize * per_page as usize).min(self.rows.len());
        let end = (start + per_page as usize).min(self.rows.len());
        (&self.rows[start..end], page, per_page)
    }
}
