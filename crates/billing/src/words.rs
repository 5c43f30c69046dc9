//! Amount-in-words rendering, Indian numbering (crore / lakh / thousand).
//!
//! Used on bill payloads so the printed bill can show e.g.
//! "Two Hundred and Thirty Six Rupees Only".

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use pressbill_core::round_currency;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn two_digits(n: u64) -> String {
    debug_assert!(n < 100);
    if n == 0 {
        String::new()
    } else if n < 20 {
        ONES[n as usize].to_string()
    } else {
        let tens = TENS[(n / 10) as usize];
        let ones = ONES[(n % 10) as usize];
        if ones.is_empty() {
            tens.to_string()
        } else {
            format!("{tens} {ones}")
        }
    }
}

fn three_digits(n: u64) -> String {
    debug_assert!(n < 1000);
    if n >= 100 {
        let rem = n % 100;
        if rem == 0 {
            format!("{} Hundred", ONES[(n / 100) as usize])
        } else {
            format!("{} Hundred and {}", ONES[(n / 100) as usize], two_digits(rem))
        }
    } else {
        two_digits(n)
    }
}

fn rupees_to_words(mut num: u64) -> String {
    if num == 0 {
        return "Zero".to_string();
    }

    let crore = num / 10_000_000;
    num %= 10_000_000;
    let lakh = num / 100_000;
    num %= 100_000;
    let thousand = num / 1_000;
    let rest = num % 1_000;

    let mut parts = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", three_digits(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", three_digits(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", three_digits(thousand)));
    }
    if rest > 0 {
        parts.push(three_digits(rest));
    }
    parts.join(" ")
}

/// Render a non-negative amount as rupees and paise in words.
///
/// The amount is rounded to currency precision first, so sub-paise inputs
/// carry into the rupee part instead of producing a phantom 100 paise.
/// Negative amounts are clamped to zero; amounts beyond u64 rupees are not
/// expected in this domain.
pub fn amount_to_words(amount: Decimal) -> String {
    let amount = round_currency(amount.max(Decimal::ZERO));
    let rupees = amount.trunc().to_u64().unwrap_or(0);
    let paise = ((amount - amount.trunc()) * Decimal::ONE_HUNDRED)
        .round()
        .to_u64()
        .unwrap_or(0);

    let mut words = format!("{} Rupees", rupees_to_words(rupees));
    if paise > 0 {
        words.push_str(" and ");
        words.push_str(&two_digits(paise));
        words.push_str(" Paise");
    }
    words.push_str(" Only");
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn whole_rupees() {
        assert_eq!(amount_to_words(dec("236")), "Two Hundred and Thirty Six Rupees Only");
        assert_eq!(amount_to_words(dec("0")), "Zero Rupees Only");
        assert_eq!(amount_to_words(dec("100")), "One Hundred Rupees Only");
    }

    #[test]
    fn rupees_and_paise() {
        assert_eq!(
            amount_to_words(dec("99.99")),
            "Ninety Nine Rupees and Ninety Nine Paise Only"
        );
        assert_eq!(amount_to_words(dec("1.05")), "One Rupees and Five Paise Only");
    }

    #[test]
    fn sub_paise_inputs_round_into_rupees() {
        assert_eq!(amount_to_words(dec("1.999")), "Two Rupees Only");
        assert_eq!(amount_to_words(dec("1.994")), "One Rupees and Ninety Nine Paise Only");
        assert_eq!(amount_to_words(dec("-5")), "Zero Rupees Only");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(
            amount_to_words(dec("12345678")),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred and Seventy Eight Rupees Only"
        );
        assert_eq!(amount_to_words(dec("100000")), "One Lakh Rupees Only");
    }
}
