//! Invoice aggregate: a customer's bill of line items.
//!
//! Lifecycle: drafted with lines, finalized (frozen) on save, immutable until
//! explicitly reopened by the edit-bill flow, which re-enters the same
//! reconciliation logic. Deletion is a soft delete.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pressbill_core::{CustomerId, DomainError, DomainResult, Entity, InvoiceId, ItemId};

use crate::config::TotalsPolicy;
use crate::line_item::{EditedField, LineItem, ReconcileError};
use crate::number::InvoiceNumber;

impl From<ReconcileError> for DomainError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::InvalidInput { .. } => DomainError::validation(err.to_string()),
            ReconcileError::DivisionByZero => DomainError::invariant(err.to_string()),
        }
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Finalized,
}

/// One priced entry on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_no: u32,
    pub item_id: ItemId,
    pub description: String,
    /// Delivery challan number, when the customer supplies one.
    pub dc_no: Option<String>,
    pub pricing: LineItem,
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    number: InvoiceNumber,
    customer_id: CustomerId,
    created_at: DateTime<Utc>,
    lines: Vec<InvoiceLine>,
    status: InvoiceStatus,
    totals_policy: TotalsPolicy,
    deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Invoice {
    /// Start an empty draft.
    pub fn draft(
        id: InvoiceId,
        number: InvoiceNumber,
        customer_id: CustomerId,
        created_at: DateTime<Utc>,
        totals_policy: TotalsPolicy,
    ) -> Self {
        Self {
            id,
            number,
            customer_id,
            created_at,
            lines: Vec::new(),
            status: InvoiceStatus::Draft,
            totals_policy,
            deleted_at: None,
        }
    }

    pub fn number(&self) -> &InvoiceNumber {
        &self.number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn totals_policy(&self) -> TotalsPolicy {
        self.totals_policy
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Exact sum of line totals (bookkeeping value, never rounded).
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(|l| l.pricing.line_total).sum()
    }

    /// Grand total under the invoice's totals policy.
    pub fn grand_total(&self) -> Decimal {
        match self.totals_policy {
            TotalsPolicy::Exact => self.subtotal(),
            TotalsPolicy::RoundedPerLine => {
                self.lines.iter().map(|l| l.pricing.rounded_total()).sum()
            }
        }
    }

    /// Append a line to a draft. Lines are numbered from 1.
    pub fn push_line(
        &mut self,
        item_id: ItemId,
        description: impl Into<String>,
        dc_no: Option<String>,
        quantity: Decimal,
        unit_rate: Decimal,
        tax_percent: Decimal,
    ) -> DomainResult<&InvoiceLine> {
        self.ensure_editable()?;

        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("line description cannot be empty"));
        }

        let pricing = LineItem::new(quantity, unit_rate, tax_percent)?;
        let line_no = self.lines.len() as u32 + 1;
        self.lines.push(InvoiceLine {
            line_no,
            item_id,
            description,
            dc_no,
            pricing,
        });
        Ok(self.lines.last().ok_or_else(DomainError::not_found)?)
    }

    /// Apply a single-field edit to one draft line via the reconciler.
    pub fn edit_line(
        &mut self,
        line_no: u32,
        field: EditedField,
        new_value: Decimal,
    ) -> DomainResult<&InvoiceLine> {
        self.ensure_editable()?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_no == line_no)
            .ok_or_else(DomainError::not_found)?;
        line.pricing = line.pricing.reconcile(field, new_value)?;
        Ok(line)
    }

    /// Drop all lines from a draft (the edit-bill flow replaces the full set).
    pub fn clear_lines(&mut self) -> DomainResult<()> {
        self.ensure_editable()?;
        self.lines.clear();
        Ok(())
    }

    /// Freeze the invoice. Requires at least one line.
    pub fn finalize(&mut self) -> DomainResult<()> {
        self.ensure_editable()?;
        if self.lines.is_empty() {
            return Err(DomainError::validation("cannot finalize an invoice without lines"));
        }
        self.status = InvoiceStatus::Finalized;
        Ok(())
    }

    /// Re-enter the edit flow on a finalized invoice.
    pub fn reopen(&mut self) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::invariant("cannot reopen a deleted invoice"));
        }
        if self.status != InvoiceStatus::Finalized {
            return Err(DomainError::invariant("only finalized invoices can be reopened"));
        }
        self.status = InvoiceStatus::Draft;
        Ok(())
    }

    /// Soft delete; the row stays for statements history exclusion.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::conflict("invoice is already deleted"));
        }
        self.deleted_at = Some(at);
        Ok(())
    }

    fn ensure_editable(&self) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::invariant("invoice is deleted"));
        }
        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::invariant(
                "invoice is finalized; reopen it before editing",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn test_number() -> InvoiceNumber {
        let date = NaiveDate::from_ymd_opt(2024, 8, 25).unwrap();
        InvoiceNumber::generate("INV", date, 1).unwrap()
    }

    fn draft(policy: TotalsPolicy) -> Invoice {
        Invoice::draft(
            InvoiceId::new(),
            test_number(),
            CustomerId::new(),
            Utc::now(),
            policy,
        )
    }

    #[test]
    fn totals_follow_policy() {
        let mut inv = draft(TotalsPolicy::Exact);
        inv.push_line(ItemId::new(), "Letterheads", None, dec("3"), dec("33.33"), dec("0"))
            .unwrap();
        inv.push_line(ItemId::new(), "Visiting cards", None, dec("2"), dec("100"), dec("18"))
            .unwrap();

        // 99.99 + 236.00
        assert_eq!(inv.subtotal(), dec("335.99"));
        assert_eq!(inv.grand_total(), dec("335.99"));

        let mut rounded = draft(TotalsPolicy::RoundedPerLine);
        rounded
            .push_line(ItemId::new(), "Letterheads", None, dec("3"), dec("33.33"), dec("0"))
            .unwrap();
        rounded
            .push_line(ItemId::new(), "Visiting cards", None, dec("2"), dec("100"), dec("18"))
            .unwrap();

        // Subtotal stays exact; grand total sums 100 + 240.
        assert_eq!(rounded.subtotal(), dec("335.99"));
        assert_eq!(rounded.grand_total(), dec("340"));
    }

    #[test]
    fn finalize_requires_lines_and_freezes_edits() {
        let mut inv = draft(TotalsPolicy::Exact);
        assert!(inv.finalize().is_err());

        inv.push_line(ItemId::new(), "Bill books", None, dec("1"), dec("250"), dec("0"))
            .unwrap();
        inv.finalize().unwrap();
        assert_eq!(inv.status(), InvoiceStatus::Finalized);

        let err = inv
            .push_line(ItemId::new(), "More", None, dec("1"), dec("10"), dec("0"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn reopen_allows_reconciling_edits_again() {
        let mut inv = draft(TotalsPolicy::Exact);
        inv.push_line(ItemId::new(), "Bill books", None, dec("2"), dec("100"), dec("18"))
            .unwrap();
        inv.finalize().unwrap();

        inv.reopen().unwrap();
        let line = inv.edit_line(1, EditedField::Total, dec("300")).unwrap();
        assert_eq!(line.pricing.unit_rate, dec("127.12"));
        inv.finalize().unwrap();
        assert_eq!(inv.grand_total(), dec("300.00"));
    }

    #[test]
    fn edit_line_propagates_reconcile_errors_and_keeps_state() {
        let mut inv = draft(TotalsPolicy::Exact);
        inv.push_line(ItemId::new(), "Pads", None, dec("0"), dec("50"), dec("0"))
            .unwrap();

        let err = inv.edit_line(1, EditedField::Total, dec("100")).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(inv.lines()[0].pricing.line_total, dec("0.00"));
    }

    #[test]
    fn soft_delete_blocks_reopen() {
        let mut inv = draft(TotalsPolicy::Exact);
        inv.push_line(ItemId::new(), "Pads", None, dec("1"), dec("50"), dec("0"))
            .unwrap();
        inv.finalize().unwrap();
        inv.soft_delete(Utc::now()).unwrap();

        assert!(inv.is_deleted());
        assert!(inv.reopen().is_err());
        assert!(inv.soft_delete(Utc::now()).is_err());
    }

    #[test]
    fn blank_descriptions_are_rejected() {
        let mut inv = draft(TotalsPolicy::Exact);
        let err = inv
            .push_line(ItemId::new(), "   ", None, dec("1"), dec("10"), dec("0"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
