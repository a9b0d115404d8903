//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts travel as `f64` on the wire. Every client-side product or sum is
//! done in `Decimal` and converted back rounded to 2 decimal places.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// quantity × unit price
pub fn line_subtotal(unit_price: f64, quantity: u32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Sum a list of amounts
pub fn sum<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    to_f64(amounts.into_iter().map(to_decimal).sum())
}

/// Average of `total` over `count` entries, zero when there are none
pub fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    to_f64(to_decimal(total) / Decimal::from(count))
}

/// Format an amount the way receipts show it: `1234.5` → `"1,234.50"`
pub fn format_amount(value: f64) -> String {
    let rounded = to_decimal(value)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}.{frac_part}")
    } else {
        format!("{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line_subtotal(1000.0, 3), 3000.0);
        assert_eq!(line_subtotal(2.35, 3), 7.05);
        assert_eq!(line_subtotal(99.99, 0), 0.0);
    }

    #[test]
    fn test_sum_avoids_float_drift() {
        assert_eq!(sum([0.1, 0.2]), 0.3);
        assert_eq!(sum(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(100.0, 3), 33.33);
        assert_eq!(average(50.0, 0), 0.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-42.0), "-42.00");
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }
}
