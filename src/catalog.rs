//! Catalog
//!
//! Sellable items and the category/brand keys they reference. Items are
//! read-only from the pricing engine's perspective; the catalog owns them.

use rust_decimal::Decimal;
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    /// Item Key
    pub struct ItemKey;
}

new_key_type! {
    /// Category Key
    pub struct CategoryKey;
}

new_key_type! {
    /// Brand Key
    pub struct BrandKey;
}

/// Errors raised while constructing a catalog item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The item name was empty.
    #[error("Item name is required")]
    MissingName,

    /// The item price was zero or negative.
    #[error("Item price must be greater than zero")]
    NonPositivePrice,

    /// The stock quantity was negative.
    #[error("Item stock quantity cannot be negative")]
    NegativeStock,
}

/// How an item is sold: by discrete quantity or by continuous weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleUnit {
    /// Sold per unit.
    Quantity,

    /// Sold per gram/ounce.
    Weight,
}

/// A sellable catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    name: String,
    price: Decimal,
    sale_unit: SaleUnit,
    category: CategoryKey,
    brand: Option<BrandKey>,
    stock_quantity: Option<Decimal>,
}

impl Item {
    /// Create a new item.
    ///
    /// The price is per unit for quantity-sold items and per gram/ounce for
    /// weight-sold items.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the name is empty or the price is not
    /// strictly positive.
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        sale_unit: SaleUnit,
        category: CategoryKey,
    ) -> Result<Self, CatalogError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(CatalogError::MissingName);
        }

        if price <= Decimal::ZERO {
            return Err(CatalogError::NonPositivePrice);
        }

        Ok(Self {
            name,
            price,
            sale_unit,
            category,
            brand: None,
            stock_quantity: None,
        })
    }

    /// Attach a brand to the item.
    #[must_use]
    pub fn with_brand(mut self, brand: BrandKey) -> Self {
        self.brand = Some(brand);
        self
    }

    /// Record a finite stock level, in the same unit the item is sold by.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NegativeStock`] if the stock level is negative.
    pub fn with_stock(mut self, stock_quantity: Decimal) -> Result<Self, CatalogError> {
        if stock_quantity < Decimal::ZERO {
            return Err(CatalogError::NegativeStock);
        }

        self.stock_quantity = Some(stock_quantity);
        Ok(self)
    }

    /// The item's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit price.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// The unit the item is sold by.
    pub fn sale_unit(&self) -> SaleUnit {
        self.sale_unit
    }

    /// The category the item belongs to.
    pub fn category(&self) -> CategoryKey {
        self.category
    }

    /// The item's brand, if any.
    pub fn brand(&self) -> Option<BrandKey> {
        self.brand
    }

    /// The remaining stock, if tracked. `None` means unlimited.
    pub fn stock_quantity(&self) -> Option<Decimal> {
        self.stock_quantity
    }

    /// Whether the item is sold by discrete quantity.
    pub fn sold_by_quantity(&self) -> bool {
        self.sale_unit == SaleUnit::Quantity
    }

    /// Whether the item is sold by weight.
    pub fn sold_by_weight(&self) -> bool {
        self.sale_unit == SaleUnit::Weight
    }

    /// Whether the requested amount can be fulfilled from stock.
    ///
    /// Untracked stock is treated as unlimited. Stock is recorded in the same
    /// unit as the item's sale unit.
    pub fn in_stock(&self, amount: Decimal) -> bool {
        match self.stock_quantity {
            None => true,
            Some(stock) => amount <= stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn category() -> CategoryKey {
        let mut keys = SlotMap::<CategoryKey, ()>::with_key();
        keys.insert(())
    }

    #[test]
    fn new_rejects_empty_name() {
        let result = Item::new("  ", Decimal::ONE, SaleUnit::Quantity, category());

        assert_eq!(result, Err(CatalogError::MissingName));
    }

    #[test]
    fn new_rejects_non_positive_price() {
        let result = Item::new("Apple", Decimal::ZERO, SaleUnit::Quantity, category());

        assert_eq!(result, Err(CatalogError::NonPositivePrice));
    }

    #[test]
    fn with_stock_rejects_negative_stock() -> testresult::TestResult {
        let item = Item::new("Apple", Decimal::ONE, SaleUnit::Quantity, category())?;

        assert_eq!(
            item.with_stock(Decimal::NEGATIVE_ONE),
            Err(CatalogError::NegativeStock)
        );

        Ok(())
    }

    #[test]
    fn sale_unit_predicates_are_mutually_exclusive() -> testresult::TestResult {
        let by_quantity = Item::new("Apple", Decimal::ONE, SaleUnit::Quantity, category())?;
        let by_weight = Item::new("Rice", Decimal::ONE, SaleUnit::Weight, category())?;

        assert!(by_quantity.sold_by_quantity());
        assert!(!by_quantity.sold_by_weight());
        assert!(by_weight.sold_by_weight());
        assert!(!by_weight.sold_by_quantity());

        Ok(())
    }

    #[test]
    fn in_stock_is_unlimited_when_untracked() -> testresult::TestResult {
        let item = Item::new("Apple", Decimal::ONE, SaleUnit::Quantity, category())?;

        assert!(item.in_stock(Decimal::from(1_000_000)));

        Ok(())
    }

    #[test]
    fn in_stock_compares_amount_against_tracked_stock() -> testresult::TestResult {
        let item = Item::new("Rice", Decimal::ONE, SaleUnit::Weight, category())?
            .with_stock(Decimal::from(500))?;

        assert!(item.in_stock(Decimal::from(500)));
        assert!(!item.in_stock(Decimal::from(501)));

        Ok(())
    }

    #[test]
    fn with_brand_records_brand() -> testresult::TestResult {
        let mut brands = SlotMap::<BrandKey, ()>::with_key();
        let brand = brands.insert(());

        let item = Item::new("Apple", Decimal::ONE, SaleUnit::Quantity, category())?
            .with_brand(brand);

        assert_eq!(item.brand(), Some(brand));

        Ok(())
    }
}
