//! Line-item reconciliation.
//!
//! A line keeps three user-editable pricing fields consistent: quantity,
//! unit rate and line total, under the invariant
//!
//! ```text
//! line_total == quantity * unit_rate * (1 + tax_percent / 100)
//! ```
//!
//! within currency rounding tolerance. Editing quantity or rate recomputes the
//! total; editing the total recomputes the rate. `last_edited` makes the
//! dispatch explicit rather than relying on field-change detection order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pressbill_core::{round_currency, round_to_nearest_ten, tax_factor};

/// Which pricing field the user touched most recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditedField {
    Quantity,
    Rate,
    Total,
}

impl core::fmt::Display for EditedField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            EditedField::Quantity => "quantity",
            EditedField::Rate => "rate",
            EditedField::Total => "total",
        };
        f.write_str(s)
    }
}

/// Reconciliation failure. The edit is rejected and the previous state stands.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The new value is unusable (negative, or large enough to overflow the
    /// arithmetic). Names the offending field so the caller can show an
    /// inline message next to it.
    #[error("invalid {field} value: {reason}")]
    InvalidInput { field: EditedField, reason: String },

    /// A total edit cannot derive a unit rate while quantity is zero.
    #[error("cannot derive unit rate from total while quantity is zero")]
    DivisionByZero,
}

/// Pricing state of one invoice line.
///
/// Immutable snapshot semantics: [`LineItem::reconcile`] returns a new state
/// and never mutates the receiver. Persistence is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    /// Fixed per line; taken from the catalog item when the line is created.
    pub tax_percent: Decimal,
    pub line_total: Decimal,
    pub last_edited: EditedField,
}

impl LineItem {
    /// Build a consistent line from quantity, rate and tax percent.
    ///
    /// Equivalent to starting from a zero line and applying a quantity edit
    /// then a rate edit.
    pub fn new(
        quantity: Decimal,
        unit_rate: Decimal,
        tax_percent: Decimal,
    ) -> Result<Self, ReconcileError> {
        if tax_percent < Decimal::ZERO {
            return Err(ReconcileError::InvalidInput {
                field: EditedField::Rate,
                reason: "tax percent must be non-negative".to_string(),
            });
        }

        let seed = Self {
            quantity: Decimal::ZERO,
            unit_rate: Decimal::ZERO,
            tax_percent,
            line_total: Decimal::ZERO,
            last_edited: EditedField::Quantity,
        };
        seed.reconcile(EditedField::Quantity, quantity)?
            .reconcile(EditedField::Rate, unit_rate)
    }

    /// Apply a single-field edit and return the next consistent state.
    ///
    /// Pure function: on error the receiver is the state to keep showing.
    pub fn reconcile(
        &self,
        field: EditedField,
        new_value: Decimal,
    ) -> Result<Self, ReconcileError> {
        if new_value < Decimal::ZERO {
            return Err(ReconcileError::InvalidInput {
                field,
                reason: "value must be non-negative".to_string(),
            });
        }

        let mut next = self.clone();
        next.last_edited = field;

        match field {
            EditedField::Quantity => {
                next.quantity = new_value;
                next.line_total = next.computed_total().ok_or_else(|| overflow(field))?;
            }
            EditedField::Rate => {
                next.unit_rate = new_value;
                next.line_total = next.computed_total().ok_or_else(|| overflow(field))?;
            }
            EditedField::Total => {
                if self.quantity.is_zero() {
                    return Err(ReconcileError::DivisionByZero);
                }
                let total = round_currency(new_value);
                let rate = next
                    .quantity
                    .checked_mul(tax_factor(next.tax_percent))
                    .and_then(|divisor| total.checked_div(divisor))
                    .ok_or_else(|| overflow(field))?;
                next.line_total = total;
                next.unit_rate = round_currency(rate);
            }
        }

        Ok(next)
    }

    /// Display total rounded to the nearest ten.
    ///
    /// Presentation only; `line_total` keeps the exact bookkeeping value.
    pub fn rounded_total(&self) -> Decimal {
        round_to_nearest_ten(self.line_total)
    }

    /// `None` when the product exceeds `Decimal` range.
    fn computed_total(&self) -> Option<Decimal> {
        self.quantity
            .checked_mul(self.unit_rate)?
            .checked_mul(tax_factor(self.tax_percent))
            .map(round_currency)
    }
}

fn overflow(field: EditedField) -> ReconcileError {
    ReconcileError::InvalidInput {
        field,
        reason: "value exceeds the representable amount range".to_string(),
    }
}
