//! Promotion records
//!
//! The persisted shape of a promotion: a type label, an optional value, a
//! polymorphic `target_type`/`target_id` pair and a free-form config map.
//! Records decode into strongly-typed, validated [`Promotion`] values at load
//! time; unknown type labels are rejected here, which is what lets the rest
//! of the crate dispatch over a closed enum.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::promotions::{Promotion, PromotionError, PromotionKind, Target};

/// Short-form target type label, after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Targets one specific item.
    Item,

    /// Targets a whole category.
    Category,
}

/// Type-specific configuration, stored as a key/value map with every field
/// optional. Unknown keys are ignored for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PromotionConfig {
    /// Units paid at full price per buy-x-get-y group. Defaults to 1.
    #[serde(default)]
    pub buy_quantity: Option<u32>,

    /// Units discounted per buy-x-get-y group. Defaults to 1.
    #[serde(default)]
    pub get_quantity: Option<u32>,

    /// Buy-x-get-y discount in percent points. Defaults to 100.
    #[serde(default)]
    pub discount_percent: Option<Decimal>,

    /// Weight-threshold minimum line weight. Defaults to 0.
    #[serde(default)]
    pub threshold_weight: Option<Decimal>,
}

/// A raw promotion record, as persisted by the administrative process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromotionRecord {
    /// Display name.
    pub name: String,

    /// One of `flat_discount`, `percentage_discount`, `buy_x_get_y`,
    /// `weight_threshold`.
    pub promotion_type: String,

    /// Discount value in money (flat) or percent points (percentage and
    /// weight-threshold). Unused for buy-x-get-y.
    #[serde(default)]
    pub value: Option<Decimal>,

    /// `Item` or `Category`, possibly fully qualified (`shop::Item`).
    pub target_type: String,

    /// External id of the target record.
    pub target_id: u64,

    /// When the promotion becomes active.
    pub start_time: Timestamp,

    /// When the promotion expires; absent means no upper bound.
    #[serde(default)]
    pub end_time: Option<Timestamp>,

    /// The code shoppers type to apply this promotion.
    #[serde(default)]
    pub promo_code: Option<String>,

    /// Type-specific configuration.
    #[serde(default)]
    pub config: PromotionConfig,
}

impl PromotionRecord {
    /// The record's normalized target kind.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::UnknownTargetType`] for labels other than
    /// `Item` and `Category` (qualified or not).
    pub fn target_kind(&self) -> Result<TargetKind, PromotionError> {
        match normalize_target_type(&self.target_type) {
            "Item" => Ok(TargetKind::Item),
            "Category" => Ok(TargetKind::Category),
            other => Err(PromotionError::UnknownTargetType(other.to_owned())),
        }
    }

    /// Decode the record into a validated [`Promotion`].
    ///
    /// `resolve` maps the record's external target id to a catalog key; the
    /// loader supplies it because id-to-key mapping lives with the store.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] if a type label is unknown, the target
    /// id does not resolve, a required value is absent, or any promotion
    /// invariant is violated.
    pub fn into_promotion(
        self,
        resolve: impl FnOnce(TargetKind, u64) -> Option<Target>,
    ) -> Result<Promotion, PromotionError> {
        let target_kind = self.target_kind()?;

        let target = resolve(target_kind, self.target_id)
            .ok_or(PromotionError::UnknownTargetId(self.target_id))?;

        let kind = match self.promotion_type.as_str() {
            "flat_discount" => PromotionKind::flat(require_value(self.value, "flat_discount")?),
            "percentage_discount" => {
                PromotionKind::percentage(require_value(self.value, "percentage_discount")?)
            }
            "buy_x_get_y" => PromotionKind::buy_x_get_y(
                self.config.buy_quantity.unwrap_or(1),
                self.config.get_quantity.unwrap_or(1),
                self.config
                    .discount_percent
                    .unwrap_or(Decimal::ONE_HUNDRED),
            ),
            "weight_threshold" => PromotionKind::weight_threshold(
                require_value(self.value, "weight_threshold")?,
                self.config.threshold_weight.unwrap_or(Decimal::ZERO),
            ),
            other => return Err(PromotionError::UnknownPromotionType(other.to_owned())),
        };

        let mut promotion = Promotion::new(self.name, target, self.start_time, kind)?;

        if let Some(end_time) = self.end_time {
            promotion = promotion.with_end_time(end_time)?;
        }

        if let Some(code) = self.promo_code {
            promotion = promotion.with_promo_code(code);
        }

        Ok(promotion)
    }
}

/// Strip any module qualification from a target type label
/// (`shop::Item` becomes `Item`).
fn normalize_target_type(label: &str) -> &str {
    label.rsplit("::").next().unwrap_or(label)
}

fn require_value(
    value: Option<Decimal>,
    promotion_type: &'static str,
) -> Result<Decimal, PromotionError> {
    value.ok_or(PromotionError::MissingValue(promotion_type))
}
