use proptest::prelude::*;

use concert_booking::services::pricing::{discount_amount, format_price, quote_price};

#[test]
fn discounted_booking_totals() {
    let quote = quote_price(150000, 10, 3);
    assert_eq!(quote.final_unit_price, 135000);
    assert_eq!(quote.total_price, 405000);
    assert_eq!(quote.discount_line().as_deref(), Some("Discount (10%): -Rp 15.000"));
    assert_eq!(format_price(quote.total_price), "Rp 405.000");
}

#[test]
fn no_discount_means_no_discount_line() {
    let quote = quote_price(250000, 0, 2);
    assert_eq!(quote.final_unit_price, 250000);
    assert_eq!(quote.total_price, 500000);
    assert!(!quote.has_discount());
    assert_eq!(quote.discount_line(), None);
}

#[test]
fn total_multiplies_rounded_unit_price() {
    // 999 * 15% = 149.85, округляется до 150 за билет.
    let quote = quote_price(999, 15, 100);
    assert_eq!(quote.discount_amount, 150);
    assert_eq!(quote.final_unit_price, 849);
    assert_eq!(quote.total_price, 84_900);
}

proptest! {
    #[test]
    fn exact_when_divisible(hundreds in 0i64..100_000, percent in 0u32..=100, count in 1u32..50) {
        let unit = hundreds * 100;
        let quote = quote_price(unit, percent, count);
        prop_assert_eq!(quote.final_unit_price * 100, unit * (100 - i64::from(percent)));
        prop_assert_eq!(quote.total_price, quote.final_unit_price * i64::from(count));
    }

    #[test]
    fn discount_is_nearest_integer(unit in 0i64..10_000_000, percent in 0u32..=100) {
        let amount = discount_amount(unit, percent);
        let exact = unit * i64::from(percent);
        // Половина округляется вверх: разница в (-50, 50].
        let diff = amount * 100 - exact;
        prop_assert!(diff > -50 && diff <= 50);
    }

    #[test]
    fn final_price_stays_within_bounds(unit in 0i64..10_000_000, percent in 0u32..=200, count in 0u32..50) {
        let quote = quote_price(unit, percent, count);
        prop_assert!(quote.final_unit_price >= 0);
        prop_assert!(quote.final_unit_price <= unit);
        prop_assert!(quote.discount_percent <= 100);
    }
}
