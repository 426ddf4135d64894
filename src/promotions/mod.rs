//! Promotions
//!
//! A promotion is a time-bounded discount rule aimed at either one specific
//! item or a whole category. Activity is a pure function of the supplied
//! clock value, so a promotion moves through pending, active and expired
//! phases without any stored state.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use slotmap::new_key_type;
use thiserror::Error;

use crate::{
    cart::{CartLine, LineAmount},
    catalog::{CategoryKey, Item, ItemKey},
    discounts,
};

pub mod record;

new_key_type! {
    /// Promotion Key
    pub struct PromotionKey;
}

/// Errors raised while constructing or decoding a promotion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// The promotion name was empty.
    #[error("Promotion name is required")]
    MissingName,

    /// The promotion type label was not one of the four known types.
    #[error("Unknown promotion type: {0}")]
    UnknownPromotionType(String),

    /// The target type label was neither `Item` nor `Category`.
    #[error("Unknown target type: {0}")]
    UnknownTargetType(String),

    /// The target id did not resolve to a known record.
    #[error("Unknown target id: {0}")]
    UnknownTargetId(u64),

    /// A `value` is required for this promotion type but was absent.
    #[error("Promotion value is required for {0}")]
    MissingValue(&'static str),

    /// The promotion `value` was zero or negative.
    #[error("Promotion value must be greater than zero")]
    NonPositiveValue,

    /// The end time was not strictly after the start time.
    #[error("Promotion end time must be after start time")]
    EndBeforeStart,

    /// `buy_quantity` or `get_quantity` was zero.
    #[error("buy_quantity and get_quantity must be at least 1")]
    InvalidBundleQuantities,

    /// `discount_percent` was zero or negative.
    #[error("discount_percent must be greater than zero")]
    NonPositiveDiscountPercent,

    /// `threshold_weight` was negative.
    #[error("threshold_weight cannot be negative")]
    NegativeThresholdWeight,
}

/// The scope a promotion discounts: one specific item, or every item in a
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// One specific catalog item.
    Item(ItemKey),

    /// Every item in a category.
    Category(CategoryKey),
}

/// Promotion type plus its type-specific configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromotionKind {
    /// A fixed amount off the line's base price, capped at the base price.
    FlatDiscount {
        /// Amount to subtract from the base price.
        amount: Decimal,
    },

    /// A fractional discount on the line's base price.
    PercentageDiscount {
        /// Fraction of the base price to subtract.
        percent: Percentage,
    },

    /// Buy X units, get Y units discounted. Quantity-sold items only.
    BuyXGetY {
        /// Units the shopper pays full price for per group.
        buy_quantity: u32,

        /// Units discounted per group.
        get_quantity: u32,

        /// Fraction of the free units' worth that is discounted.
        discount_percent: Percentage,
    },

    /// A fractional discount once the line's weight reaches a threshold.
    /// Weight-sold items only.
    WeightThreshold {
        /// Fraction of the base price to subtract.
        percent: Percentage,

        /// Minimum line weight for the discount to apply.
        threshold_weight: Decimal,
    },
}

impl PromotionKind {
    /// Flat discount of the given amount.
    pub fn flat(amount: Decimal) -> Self {
        Self::FlatDiscount { amount }
    }

    /// Percentage discount, given in percent points (`20` means 20%).
    pub fn percentage(percent_points: Decimal) -> Self {
        Self::PercentageDiscount {
            percent: fraction(percent_points),
        }
    }

    /// Buy-X-get-Y with the discount given in percent points.
    pub fn buy_x_get_y(buy_quantity: u32, get_quantity: u32, percent_points: Decimal) -> Self {
        Self::BuyXGetY {
            buy_quantity,
            get_quantity,
            discount_percent: fraction(percent_points),
        }
    }

    /// Weight-threshold discount with the discount given in percent points.
    pub fn weight_threshold(percent_points: Decimal, threshold_weight: Decimal) -> Self {
        Self::WeightThreshold {
            percent: fraction(percent_points),
            threshold_weight,
        }
    }
}

/// Convert percent points to a fractional [`Percentage`].
fn fraction(percent_points: Decimal) -> Percentage {
    Percentage::from(percent_points / Decimal::ONE_HUNDRED)
}

/// A time-bounded promotional discount rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    name: String,
    target: Target,
    start_time: Timestamp,
    end_time: Option<Timestamp>,
    promo_code: Option<String>,
    kind: PromotionKind,
}

impl Promotion {
    /// Create a new promotion starting at `start_time` with no upper bound.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] if the name is empty or the kind's
    /// configuration violates an invariant (non-positive value or percent,
    /// zero bundle quantities, negative threshold).
    pub fn new(
        name: impl Into<String>,
        target: Target,
        start_time: Timestamp,
        kind: PromotionKind,
    ) -> Result<Self, PromotionError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(PromotionError::MissingName);
        }

        validate_kind(&kind)?;

        Ok(Self {
            name,
            target,
            start_time,
            end_time: None,
            promo_code: None,
            kind,
        })
    }

    /// Bound the promotion's activity window.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::EndBeforeStart`] unless `end_time` is
    /// strictly after the start time.
    pub fn with_end_time(mut self, end_time: Timestamp) -> Result<Self, PromotionError> {
        if end_time <= self.start_time {
            return Err(PromotionError::EndBeforeStart);
        }

        self.end_time = Some(end_time);
        Ok(self)
    }

    /// Attach the promo code shoppers use to apply this promotion.
    #[must_use]
    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }

    /// The promotion's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The item or category the promotion discounts.
    pub fn target(&self) -> Target {
        self.target
    }

    /// When the promotion becomes active.
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// When the promotion expires, if bounded.
    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    /// The promo code, if the promotion is code-activated.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// The promotion type and configuration.
    pub fn kind(&self) -> &PromotionKind {
        &self.kind
    }

    /// Whether the promotion is active at the given instant.
    ///
    /// Active means `start_time <= now` and, when an end time is set,
    /// `end_time >= now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.start_time <= now && self.end_time.is_none_or(|end| end >= now)
    }

    /// Whether the promotion applies to the given item at the given instant.
    ///
    /// An inactive promotion applies to nothing. Otherwise the target must
    /// match the item's key, or the item's category for category targets.
    pub fn applies_to(&self, item_key: ItemKey, item: &Item, now: Timestamp) -> bool {
        if !self.is_active(now) {
            return false;
        }

        match self.target {
            Target::Item(key) => key == item_key,
            Target::Category(key) => key == item.category(),
        }
    }

    /// Calculate the discount this promotion grants the given cart line.
    ///
    /// Type/line combinations that are not eligible (a buy-X-get-Y on a
    /// weight-sold line, say) yield zero rather than an error. The result is
    /// clamped to the line's base price so the final price cannot go
    /// negative.
    pub fn discount(&self, line: &CartLine, item: &Item) -> Decimal {
        let base_price = line.base_price(item);

        let raw = match (&self.kind, line.amount()) {
            (PromotionKind::FlatDiscount { amount }, _) => {
                discounts::flat_discount(*amount, base_price)
            }
            (PromotionKind::PercentageDiscount { percent }, _) => {
                discounts::percentage_discount(*percent, base_price)
            }
            (
                PromotionKind::BuyXGetY {
                    buy_quantity,
                    get_quantity,
                    discount_percent,
                },
                LineAmount::Quantity(quantity),
            ) => discounts::buy_x_get_y(
                *buy_quantity,
                *get_quantity,
                *discount_percent,
                quantity,
                item.price(),
            ),
            (PromotionKind::BuyXGetY { .. }, LineAmount::Weight(_)) => Decimal::ZERO,
            (
                PromotionKind::WeightThreshold {
                    percent,
                    threshold_weight,
                },
                LineAmount::Weight(weight),
            ) => discounts::weight_threshold(*percent, *threshold_weight, weight, base_price),
            (PromotionKind::WeightThreshold { .. }, LineAmount::Quantity(_)) => Decimal::ZERO,
        };

        raw.clamp(Decimal::ZERO, base_price)
    }
}

/// Check the per-type configuration invariants.
fn validate_kind(kind: &PromotionKind) -> Result<(), PromotionError> {
    match kind {
        PromotionKind::FlatDiscount { amount } => {
            if *amount <= Decimal::ZERO {
                return Err(PromotionError::NonPositiveValue);
            }
        }
        PromotionKind::PercentageDiscount { percent } => {
            if *percent * Decimal::ONE <= Decimal::ZERO {
                return Err(PromotionError::NonPositiveValue);
            }
        }
        PromotionKind::BuyXGetY {
            buy_quantity,
            get_quantity,
            discount_percent,
        } => {
            if *buy_quantity == 0 || *get_quantity == 0 {
                return Err(PromotionError::InvalidBundleQuantities);
            }
            if *discount_percent * Decimal::ONE <= Decimal::ZERO {
                return Err(PromotionError::NonPositiveDiscountPercent);
            }
        }
        PromotionKind::WeightThreshold {
            percent,
            threshold_weight,
        } => {
            if *percent * Decimal::ONE <= Decimal::ZERO {
                return Err(PromotionError::NonPositiveValue);
            }
            if *threshold_weight < Decimal::ZERO {
                return Err(PromotionError::NegativeThresholdWeight);
            }
        }
    }

    Ok(())
}
