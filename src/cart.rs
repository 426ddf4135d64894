//! Cart
//!
//! An ordered collection of cart lines (one per item) plus the promo codes
//! the shopper has manually applied. Mutations assume a single writer per
//! cart; any mutual exclusion across callers belongs to the storage layer.

use jiff::Timestamp;
use rust_decimal::Decimal;
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::{Item, ItemKey, SaleUnit},
    promotions::{PromotionKey, Target},
    repositories::{ItemRepository, PromotionRepository},
};

new_key_type! {
    /// Cart Key
    pub struct CartKey;
}

/// Input errors for cart mutations. These indicate caller misuse and are
/// never part of the normal shopping flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A quantity-sold item was added without a quantity.
    #[error("Quantity required for {0}")]
    QuantityRequired(String),

    /// A weight-sold item was added without a weight.
    #[error("Weight required for {0}")]
    WeightRequired(String),

    /// The supplied amount was zero or negative.
    #[error("Amount must be greater than zero for {0}")]
    NonPositiveAmount(String),
}

/// Expected business-flow outcomes of the promo-code workflow. The caller
/// branches on these; they are not programmer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoCodeError {
    /// No promotion carries this code.
    #[error("Invalid promo code")]
    InvalidCode,

    /// The promotion is not active right now.
    #[error("Promotion has expired")]
    Expired,

    /// The cart has no lines to discount.
    #[error("Cannot apply a promo code to an empty cart")]
    EmptyCart,

    /// No line's item matches the promotion's target.
    #[error("No valid item in cart for this promo code")]
    NoMatchingItem,

    /// The promotion is already attached to this cart.
    #[error("Promo code already applied")]
    AlreadyApplied,
}

/// The amount on a cart line: a quantity or a weight, matching the item's
/// sale unit, never both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineAmount {
    /// Number of units, for quantity-sold items.
    Quantity(Decimal),

    /// Weight in the catalog's weight unit, for weight-sold items.
    Weight(Decimal),
}

impl LineAmount {
    /// The numeric amount, whichever side is set.
    pub fn value(self) -> Decimal {
        match self {
            LineAmount::Quantity(quantity) => quantity,
            LineAmount::Weight(weight) => weight,
        }
    }

    /// The sale unit this amount corresponds to.
    pub fn unit(self) -> SaleUnit {
        match self {
            LineAmount::Quantity(_) => SaleUnit::Quantity,
            LineAmount::Weight(_) => SaleUnit::Weight,
        }
    }
}

/// One entry in a cart: an item reference plus an amount.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    item: ItemKey,
    amount: LineAmount,
}

impl CartLine {
    pub(crate) fn new(item: ItemKey, amount: LineAmount) -> Self {
        Self { item, amount }
    }

    /// The catalog item this line references.
    pub fn item(&self) -> ItemKey {
        self.item
    }

    /// The line's amount.
    pub fn amount(&self) -> LineAmount {
        self.amount
    }

    /// The line price before any discount: unit price times amount.
    pub fn base_price(&self, item: &Item) -> Decimal {
        item.price() * self.amount.value()
    }

    /// Add to the line's amount. Units always match because a line is only
    /// ever incremented through `Cart::add_item` for the same item.
    fn increment(&mut self, amount: LineAmount) {
        self.amount = match (self.amount, amount) {
            (LineAmount::Quantity(current), LineAmount::Quantity(add)) => {
                LineAmount::Quantity(current + add)
            }
            (LineAmount::Weight(current), LineAmount::Weight(add)) => {
                LineAmount::Weight(current + add)
            }
            (current, _) => current,
        };
    }
}

/// A shopping cart: ordered lines plus manually applied promotion ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: SmallVec<[CartLine; 8]>,
    applied_promotions: Vec<PromotionKey>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount of an item to the cart.
    ///
    /// Creates a line on first add and increments the existing line on
    /// subsequent adds of the same item.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the amount's unit does not match the item's
    /// sale unit, or the amount is not strictly positive.
    pub fn add_item(
        &mut self,
        key: ItemKey,
        item: &Item,
        amount: LineAmount,
    ) -> Result<(), CartError> {
        if item.sale_unit() != amount.unit() {
            return Err(match item.sale_unit() {
                SaleUnit::Quantity => CartError::QuantityRequired(item.name().to_owned()),
                SaleUnit::Weight => CartError::WeightRequired(item.name().to_owned()),
            });
        }

        if amount.value() <= Decimal::ZERO {
            return Err(CartError::NonPositiveAmount(item.name().to_owned()));
        }

        match self.lines.iter_mut().find(|line| line.item == key) {
            Some(line) => line.increment(amount),
            None => self.lines.push(CartLine::new(key, amount)),
        }

        Ok(())
    }

    /// Remove an item's line from the cart. No-op if the item is not in the
    /// cart.
    ///
    /// Any applied promotion targeting exactly that item is detached at the
    /// same time, keeping the applied list consistent with the cart's
    /// contents.
    pub fn remove_item(&mut self, key: ItemKey, promotions: &impl PromotionRepository) {
        self.lines.retain(|line| line.item != key);

        self.applied_promotions.retain(|&id| {
            promotions
                .find_by_id(id)
                .is_none_or(|promotion| promotion.target() != Target::Item(key))
        });
    }

    /// Remove all lines and detach all applied promotions.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.applied_promotions.clear();
    }

    /// Apply a promo code to the cart.
    ///
    /// The checks run in a fixed order: unknown code, inactive promotion,
    /// empty cart, no matching item, already applied.
    ///
    /// # Errors
    ///
    /// Returns the [`PromoCodeError`] for the first failed check.
    pub fn apply_promo_code(
        &mut self,
        code: &str,
        promotions: &impl PromotionRepository,
        items: &impl ItemRepository,
        now: Timestamp,
    ) -> Result<PromotionKey, PromoCodeError> {
        let (key, promotion) = promotions
            .find_by_code(code)
            .ok_or(PromoCodeError::InvalidCode)?;

        if !promotion.is_active(now) {
            return Err(PromoCodeError::Expired);
        }

        if self.lines.is_empty() {
            return Err(PromoCodeError::EmptyCart);
        }

        let any_match = self.lines.iter().any(|line| {
            items
                .find_by_id(line.item)
                .is_some_and(|item| promotion.applies_to(line.item, &item, now))
        });

        if !any_match {
            return Err(PromoCodeError::NoMatchingItem);
        }

        if self.applied_promotions.contains(&key) {
            return Err(PromoCodeError::AlreadyApplied);
        }

        tracing::debug!(code, promotion = promotion.name(), "promo code applied");
        self.applied_promotions.push(key);

        Ok(key)
    }

    /// Remove a previously applied promo code from the cart.
    ///
    /// Removing a known code that is not currently applied is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PromoCodeError::InvalidCode`] if no promotion carries the
    /// code.
    pub fn remove_promo_code(
        &mut self,
        code: &str,
        promotions: &impl PromotionRepository,
    ) -> Result<(), PromoCodeError> {
        let (key, _) = promotions
            .find_by_code(code)
            .ok_or(PromoCodeError::InvalidCode)?;

        self.applied_promotions.retain(|&id| id != key);

        Ok(())
    }

    /// The cart's lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for the given item, if present.
    pub fn line_for(&self, key: ItemKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item == key)
    }

    /// The manually applied promotion ids, in application order.
    pub fn applied_promotions(&self) -> &[PromotionKey] {
        &self.applied_promotions
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
