use rust_decimal::Decimal;

/// Computed monetary fields for a booking. Always satisfies
/// `total = subtotal - discount + tax + tip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
}

/// Service for booking price and tax arithmetic.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Line total for one booking item: unit price times quantity.
    pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Sum of all line totals.
    pub fn subtotal(line_totals: &[Decimal]) -> Decimal {
        line_totals.iter().sum()
    }

    /// Tax applied once per booking: `subtotal * rate / 100`, where the
    /// rate is a percentage (e.g. 7.00). Rounded to cents.
    pub fn tax_amount(subtotal: Decimal, rate_percent: Decimal) -> Decimal {
        (subtotal * rate_percent / Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Assemble the full monetary breakdown. Discount is currently always
    /// zero; the field is the hook for future discount logic.
    pub fn totals(subtotal: Decimal, tax: Decimal, tip: Decimal) -> BookingTotals {
        let discount = Decimal::ZERO;
        BookingTotals {
            subtotal,
            discount,
            tax,
            tip,
            total: subtotal - discount + tax + tip,
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn cents(c: u32) -> Decimal {
        Decimal::from(c) / Decimal::from(100)
    }

    #[test]
    fn prop_line_total_matches_multiplication() {
        proptest!(|(quantity in 1i32..=1000, price_cents in 0u32..=100_000u32)| {
            let price = cents(price_cents);
            prop_assert_eq!(
                PriceCalculator::line_total(quantity, price),
                Decimal::from(quantity) * price
            );
        });
    }

    #[test]
    fn prop_totals_formula_holds() {
        proptest!(|(
            subtotal_cents in 0u32..=1_000_000u32,
            rate_hundredths in 0u32..=1500u32,
            tip_cents in 0u32..=10_000u32
        )| {
            let subtotal = cents(subtotal_cents);
            let rate = cents(rate_hundredths);
            let tax = PriceCalculator::tax_amount(subtotal, rate);
            let totals = PriceCalculator::totals(subtotal, tax, cents(tip_cents));
            prop_assert_eq!(
                totals.total,
                totals.subtotal - totals.discount + totals.tax + totals.tip
            );
        });
    }

    #[test]
    fn prop_totals_never_negative() {
        proptest!(|(
            subtotal_cents in 0u32..=1_000_000u32,
            rate_hundredths in 0u32..=1500u32,
            tip_cents in 0u32..=10_000u32
        )| {
            let subtotal = cents(subtotal_cents);
            let tax = PriceCalculator::tax_amount(subtotal, cents(rate_hundredths));
            let totals = PriceCalculator::totals(subtotal, tax, cents(tip_cents));
            prop_assert!(totals.total >= Decimal::ZERO);
            prop_assert!(totals.total >= totals.subtotal + totals.tax + totals.tip - totals.discount);
        });
    }

    #[test]
    fn prop_subtotal_order_independent() {
        proptest!(|(line_cents in prop::collection::vec(0u32..=100_000u32, 1..=20))| {
            let lines: Vec<Decimal> = line_cents.iter().map(|&c| cents(c)).collect();
            let mut reversed = lines.clone();
            reversed.reverse();
            prop_assert_eq!(
                PriceCalculator::subtotal(&lines),
                PriceCalculator::subtotal(&reversed)
            );
        });
    }
}
