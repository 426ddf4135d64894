//! Discounts
//!
//! The four pure discount calculators, one per promotion type. Each takes the
//! relevant line figures and returns a non-negative discount amount; dispatch
//! by promotion type lives in [`crate::promotions`].

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to two decimal places, away from zero on midpoints.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Flat discount, capped at the line's base price so the final price can
/// never go negative.
pub fn flat_discount(amount: Decimal, base_price: Decimal) -> Decimal {
    amount.min(base_price)
}

/// Percentage discount on the line's base price. A 100% discount yields a
/// free line.
pub fn percentage_discount(percent: Percentage, base_price: Decimal) -> Decimal {
    round2(percent * base_price)
}

/// Buy-X-get-Y discount for quantity-sold items.
///
/// Every full group of `buy_quantity + get_quantity` units earns
/// `get_quantity` free (or partially free) units; the discount is the free
/// units' worth at `discount_percent` of the unit price. Lines with fewer
/// units than one full group earn nothing.
pub fn buy_x_get_y(
    buy_quantity: u32,
    get_quantity: u32,
    discount_percent: Percentage,
    quantity: Decimal,
    unit_price: Decimal,
) -> Decimal {
    let group_size = Decimal::from(buy_quantity + get_quantity);

    if group_size <= Decimal::ZERO || quantity < group_size {
        return Decimal::ZERO;
    }

    let full_groups = (quantity / group_size).floor();
    let free_units = full_groups * Decimal::from(get_quantity);

    round2(discount_percent * (free_units * unit_price))
}

/// Weight-threshold discount for weight-sold items: a percentage off the base
/// price once the line's weight reaches the threshold, nothing below it.
pub fn weight_threshold(
    percent: Percentage,
    threshold_weight: Decimal,
    weight: Decimal,
    base_price: Decimal,
) -> Decimal {
    if weight >= threshold_weight {
        round2(percent * base_price)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(points: i64) -> Percentage {
        Percentage::from(Decimal::from(points) / Decimal::ONE_HUNDRED)
    }

    #[test]
    fn flat_discount_is_capped_at_base_price() {
        // 50.00 off a 10.00 line discounts exactly 10.00.
        let discount = flat_discount(Decimal::new(5000, 2), Decimal::new(1000, 2));

        assert_eq!(discount, Decimal::new(1000, 2));
    }

    #[test]
    fn flat_discount_below_base_price_is_unchanged() {
        let discount = flat_discount(Decimal::new(300, 2), Decimal::new(1000, 2));

        assert_eq!(discount, Decimal::new(300, 2));
    }

    #[test]
    fn percentage_discount_of_one_hundred_frees_the_line() {
        let discount = percentage_discount(percent(100), Decimal::new(10000, 2));

        assert_eq!(discount, Decimal::new(10000, 2));
    }

    #[test]
    fn percentage_discount_rounds_midpoints_away_from_zero() {
        // 15% of 10.03 = 1.5045, which rounds to 1.50; 25% of 0.10 = 0.025,
        // which rounds up to 0.03.
        assert_eq!(
            percentage_discount(percent(15), Decimal::new(1003, 2)),
            Decimal::new(150, 2)
        );
        assert_eq!(
            percentage_discount(percent(25), Decimal::new(10, 2)),
            Decimal::new(3, 2)
        );
    }

    #[test]
    fn buy_two_get_one_free_discounts_one_unit_per_group() {
        // Four units at 2.00 with buy 2 get 1: one full group of three, so
        // one free unit worth 2.00.
        let discount = buy_x_get_y(2, 1, percent(100), Decimal::from(4), Decimal::new(200, 2));

        assert_eq!(discount, Decimal::new(200, 2));
    }

    #[test]
    fn buy_x_get_y_is_zero_below_one_full_group() {
        let discount = buy_x_get_y(2, 1, percent(100), Decimal::from(2), Decimal::new(200, 2));

        assert_eq!(discount, Decimal::ZERO);
    }

    #[test]
    fn buy_x_get_y_honours_partial_discount_percent() {
        // Six units, buy 1 get 1 at 50%: three free units at half of 4.00.
        let discount = buy_x_get_y(1, 1, percent(50), Decimal::from(6), Decimal::new(400, 2));

        assert_eq!(discount, Decimal::new(600, 2));
    }

    #[test]
    fn weight_threshold_unmet_earns_nothing() {
        let discount = weight_threshold(
            percent(20),
            Decimal::from(100),
            Decimal::from(50),
            Decimal::new(500, 2),
        );

        assert_eq!(discount, Decimal::ZERO);
    }

    #[test]
    fn weight_threshold_met_discounts_base_price() {
        let discount = weight_threshold(
            percent(20),
            Decimal::from(100),
            Decimal::from(150),
            Decimal::new(1500, 2),
        );

        assert_eq!(discount, Decimal::new(300, 2));
    }

    #[test]
    fn weight_exactly_at_threshold_qualifies() {
        let discount = weight_threshold(
            percent(10),
            Decimal::from(100),
            Decimal::from(100),
            Decimal::new(1000, 2),
        );

        assert_eq!(discount, Decimal::new(100, 2));
    }
}
