//! Billing configuration.
//!
//! Passed explicitly into the operations that need it; there is no ambient
//! global configuration.

use core::str::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pressbill_core::DomainError;

/// How an invoice aggregates its lines into a grand total.
///
/// The subtotal is always the exact sum of line totals; this policy only
/// decides what the grand total sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsPolicy {
    /// Grand total equals the exact subtotal.
    Exact,
    /// Grand total sums each line's nearest-ten display value.
    RoundedPerLine,
}

impl FromStr for TotalsPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(TotalsPolicy::Exact),
            "rounded_per_line" => Ok(TotalsPolicy::RoundedPerLine),
            other => Err(DomainError::validation(format!(
                "unknown totals policy: {other} (expected exact or rounded_per_line)"
            ))),
        }
    }
}

/// Billing defaults applied when a request does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Prefix of generated invoice numbers, e.g. `INV` in `INV-240825-00042`.
    pub number_prefix: String,
    /// Tax percent used for lines whose item carries no tax configuration.
    pub default_tax_percent: Decimal,
    /// Default totals aggregation for new invoices.
    pub totals_policy: TotalsPolicy,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            number_prefix: "INV".to_string(),
            default_tax_percent: Decimal::ZERO,
            totals_policy: TotalsPolicy::Exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_policy_parses_both_variants() {
        assert_eq!("exact".parse::<TotalsPolicy>().unwrap(), TotalsPolicy::Exact);
        assert_eq!(
            "rounded_per_line".parse::<TotalsPolicy>().unwrap(),
            TotalsPolicy::RoundedPerLine
        );
        assert!("nearest-10".parse::<TotalsPolicy>().is_err());
    }
}
