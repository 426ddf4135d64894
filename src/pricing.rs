//! Pricing
//!
//! The pricing engine walks the cart once, picking the single best applied
//! promotion for each line. Item-targeted promotions are consumed by at most
//! one line per pass; category-targeted promotions may discount every
//! eligible line. The pass is a pure read over a snapshot of active
//! promotions and the cart, so it is idempotent and safely retryable.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    cart::{Cart, LineAmount},
    catalog::ItemKey,
    promotions::{Promotion, PromotionKey, Target},
    repositories::{ItemRepository, PromotionRepository},
};

/// Data-integrity failures during a pricing pass. These propagate; they are
/// never silently priced as zero.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A cart line references an item the catalog no longer knows.
    #[error("Unknown item in cart: {0:?}")]
    UnknownItem(ItemKey),
}

/// Per-line pricing breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBreakdown {
    /// The item the line references.
    pub item: ItemKey,

    /// The item's display name, for receipts.
    pub item_name: String,

    /// The line's quantity or weight.
    pub amount: LineAmount,

    /// Line price before any discount.
    pub base_price: Decimal,

    /// The chosen promotion's discount, zero if none applied.
    pub discount: Decimal,

    /// `base_price - discount`.
    pub final_price: Decimal,

    /// Name of the promotion that was applied, if any.
    pub promotion: Option<String>,
}

/// The result of pricing a cart: per-line breakdowns plus totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingResult {
    /// One breakdown per cart line, in cart order.
    pub items: Vec<LineBreakdown>,

    /// Sum of base prices.
    pub subtotal: Decimal,

    /// Sum of discounts.
    pub total_discount: Decimal,

    /// `subtotal - total_discount`.
    pub total: Decimal,
}

/// Prices carts against a catalog and a promotion store.
#[derive(Debug)]
pub struct PricingEngine<'a, I, P> {
    items: &'a I,
    promotions: &'a P,
}

impl<'a, I, P> PricingEngine<'a, I, P>
where
    I: ItemRepository,
    P: PromotionRepository,
{
    /// Create an engine over the given repositories.
    pub fn new(items: &'a I, promotions: &'a P) -> Self {
        Self { items, promotions }
    }

    /// Price the cart at the given instant.
    ///
    /// Active promotions are loaded once per call. Only promotions the
    /// shopper applied to the cart are considered, and only where they apply
    /// to the line's item. Ties keep the first-seen candidate in promotion
    /// load order. An empty cart prices to all zeros.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnknownItem`] if a line references an item
    /// missing from the catalog.
    pub fn calculate(&self, cart: &Cart, now: Timestamp) -> Result<PricingResult, PricingError> {
        // One snapshot of active promotions for the whole pass.
        let applied: Vec<(PromotionKey, Promotion)> = self
            .promotions
            .find_active(now)
            .into_iter()
            .filter(|(key, _)| cart.applied_promotions().contains(key))
            .collect();

        let mut used: FxHashSet<PromotionKey> = FxHashSet::default();
        let mut result = PricingResult::default();

        for line in cart.lines() {
            let item = self
                .items
                .find_by_id(line.item())
                .ok_or(PricingError::UnknownItem(line.item()))?;

            let base_price = line.base_price(&item);

            let mut discount = Decimal::ZERO;
            let mut best: Option<(PromotionKey, &Promotion)> = None;

            for (key, promotion) in &applied {
                if !promotion.applies_to(line.item(), &item, now) {
                    continue;
                }

                if used.contains(key) && matches!(promotion.target(), Target::Item(_)) {
                    continue;
                }

                // Strictly greater, so ties keep the first-seen candidate and
                // a zero discount never selects a promotion.
                let candidate = promotion.discount(line, &item);
                if candidate > discount {
                    discount = candidate;
                    best = Some((*key, promotion));
                }
            }

            if let Some((key, promotion)) = best {
                if matches!(promotion.target(), Target::Item(_)) {
                    used.insert(key);
                }

                tracing::debug!(
                    item = item.name(),
                    promotion = promotion.name(),
                    %discount,
                    "promotion selected for line"
                );
            }

            result.items.push(LineBreakdown {
                item: line.item(),
                item_name: item.name().to_owned(),
                amount: line.amount(),
                base_price,
                discount,
                final_price: base_price - discount,
                promotion: best.map(|(_, promotion)| promotion.name().to_owned()),
            });

            result.subtotal += base_price;
            result.total_discount += discount;
        }

        result.total = result.subtotal - result.total_discount;

        tracing::trace!(
            subtotal = %result.subtotal,
            total_discount = %result.total_discount,
            total = %result.total,
            "cart priced"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        catalog::{Item, SaleUnit},
        promotions::PromotionKind,
        repositories::{
            InMemoryCatalog, InMemoryPromotions, MockItemRepository, MockPromotionRepository,
        },
    };

    use super::*;

    #[test]
    fn empty_cart_prices_to_all_zeros() -> TestResult {
        let catalog = InMemoryCatalog::new();
        let promotions = InMemoryPromotions::new();
        let engine = PricingEngine::new(&catalog, &promotions);

        let result = engine.calculate(&Cart::new(), "2026-08-25T12:00:00Z".parse()?)?;

        assert!(result.items.is_empty());
        assert_eq!(result.subtotal, Decimal::ZERO);
        assert_eq!(result.total_discount, Decimal::ZERO);
        assert_eq!(result.total, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn unknown_item_in_cart_propagates_as_error() -> TestResult {
        let now: Timestamp = "2026-08-25T12:00:00Z".parse()?;

        let mut keys = SlotMap::<ItemKey, ()>::with_key();
        let ghost = keys.insert(());

        let mut items = MockItemRepository::new();
        items.expect_find_by_id().returning(|_| None);

        let mut promotions = MockPromotionRepository::new();
        promotions.expect_find_active().returning(|_| Vec::new());

        let mut cart = Cart::new();
        // Line inserted through the catalog-backed path in production; here
        // the mock simulates an item deleted after the cart was built.
        let mut catalog = InMemoryCatalog::new();
        let produce = catalog.add_category("Produce");
        let item = Item::new("Ghost", Decimal::ONE, SaleUnit::Quantity, produce)?;
        cart.add_item(ghost, &item, LineAmount::Quantity(Decimal::ONE))?;

        let engine = PricingEngine::new(&items, &promotions);

        assert_eq!(
            engine.calculate(&cart, now),
            Err(PricingError::UnknownItem(ghost))
        );

        Ok(())
    }

    #[test]
    fn active_promotions_are_loaded_once_per_pass() -> TestResult {
        let now: Timestamp = "2026-08-25T12:00:00Z".parse()?;

        let mut catalog = InMemoryCatalog::new();
        let produce = catalog.add_category("Produce");
        let apple = catalog.insert(Item::new(
            "Apple",
            Decimal::TEN,
            SaleUnit::Quantity,
            produce,
        )?);
        let pear = catalog.insert(Item::new(
            "Pear",
            Decimal::TEN,
            SaleUnit::Quantity,
            produce,
        )?);

        let apple_item = catalog.item(apple).expect("item in catalog").clone();
        let pear_item = catalog.item(pear).expect("item in catalog").clone();

        let mut cart = Cart::new();
        cart.add_item(apple, &apple_item, LineAmount::Quantity(Decimal::ONE))?;
        cart.add_item(pear, &pear_item, LineAmount::Quantity(Decimal::ONE))?;

        let mut promotions = MockPromotionRepository::new();
        promotions
            .expect_find_active()
            .times(1)
            .returning(|_| Vec::new());

        let engine = PricingEngine::new(&catalog, &promotions);
        let result = engine.calculate(&cart, now)?;

        assert_eq!(result.items.len(), 2);

        Ok(())
    }

    #[test]
    fn promotions_not_applied_to_the_cart_are_ignored() -> TestResult {
        let now: Timestamp = "2026-08-25T12:00:00Z".parse()?;
        let start: Timestamp = "2026-01-01T00:00:00Z".parse()?;

        let mut catalog = InMemoryCatalog::new();
        let produce = catalog.add_category("Produce");
        let apple = catalog.insert(Item::new(
            "Apple",
            Decimal::TEN,
            SaleUnit::Quantity,
            produce,
        )?);
        let item = catalog.item(apple).expect("item in catalog").clone();

        let mut promotions = InMemoryPromotions::new();
        promotions.insert(crate::promotions::Promotion::new(
            "Produce sale",
            crate::promotions::Target::Category(produce),
            start,
            PromotionKind::percentage(Decimal::from(50)),
        )?);

        let mut cart = Cart::new();
        cart.add_item(apple, &item, LineAmount::Quantity(Decimal::ONE))?;

        let engine = PricingEngine::new(&catalog, &promotions);
        let result = engine.calculate(&cart, now)?;

        // Active but never applied by the shopper, so no discount.
        assert_eq!(result.total_discount, Decimal::ZERO);
        assert_eq!(result.total, Decimal::TEN);

        Ok(())
    }
}
