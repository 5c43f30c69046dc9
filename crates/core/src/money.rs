//! Currency arithmetic helpers.
//!
//! All monetary values are `rust_decimal::Decimal`. Bookkeeping values keep
//! full precision; these helpers produce the two rounded forms the app needs:
//! currency precision (2 dp, half-up) and the nearest-ten display value.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places carried by currency amounts.
pub const CURRENCY_DP: u32 = 2;

/// Round to currency precision (2 dp, round-half-up).
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the nearest multiple of ten (half-up).
///
/// Display-only: callers must never write this value back into bookkeeping
/// fields.
pub fn round_to_nearest_ten(amount: Decimal) -> Decimal {
    (amount / Decimal::TEN).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * Decimal::TEN
}

/// Multiplier applied to a pre-tax amount for a given tax percentage.
pub fn tax_factor(tax_percent: Decimal) -> Decimal {
    Decimal::ONE + tax_percent / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn round_currency_is_half_up() {
        assert_eq!(round_currency(dec("127.1186")), dec("127.12"));
        assert_eq!(round_currency(dec("1.005")), dec("1.01"));
        assert_eq!(round_currency(dec("1.004")), dec("1.00"));
    }

    #[test]
    fn round_to_nearest_ten_is_half_up() {
        assert_eq!(round_to_nearest_ten(dec("99.99")), dec("100"));
        assert_eq!(round_to_nearest_ten(dec("95")), dec("100"));
        assert_eq!(round_to_nearest_ten(dec("94.99")), dec("90"));
        assert_eq!(round_to_nearest_ten(dec("0")), dec("0"));
    }

    #[test]
    fn tax_factor_from_percent() {
        assert_eq!(tax_factor(dec("18")), dec("1.18"));
        assert_eq!(tax_factor(dec("0")), Decimal::ONE);
    }
}
