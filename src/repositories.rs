//! Repositories
//!
//! The engine's external collaborators, specified as traits: a catalog of
//! items, a promotion store, and cart persistence. The in-memory
//! implementations back the tests and small deployments; a database-backed
//! caller supplies its own.

use jiff::Timestamp;
use slotmap::{SecondaryMap, SlotMap};

use crate::{
    cart::{Cart, CartKey},
    catalog::{BrandKey, CategoryKey, Item, ItemKey},
    promotions::{Promotion, PromotionKey},
};

/// Read access to catalog items.
#[cfg_attr(test, mockall::automock)]
pub trait ItemRepository {
    /// Look up an item by key.
    fn find_by_id(&self, id: ItemKey) -> Option<Item>;
}

/// Read access to promotions.
///
/// `find_active` must return promotions in a stable load order; the pricing
/// engine breaks discount ties by keeping the first-seen candidate.
#[cfg_attr(test, mockall::automock)]
pub trait PromotionRepository {
    /// Look up a promotion by its promo code.
    fn find_by_code(&self, code: &str) -> Option<(PromotionKey, Promotion)>;

    /// Look up a promotion by key.
    fn find_by_id(&self, id: PromotionKey) -> Option<Promotion>;

    /// All promotions active at the given instant, in load order.
    fn find_active(&self, now: Timestamp) -> Vec<(PromotionKey, Promotion)>;
}

/// Persistence for cart aggregates. The cart is the unit of mutation; the
/// caller saves it back after each mutating call.
pub trait CartRepository {
    /// Create a new empty cart and return its key.
    fn create(&mut self) -> CartKey;

    /// Load a cart by key.
    fn find_by_id(&self, id: CartKey) -> Option<Cart>;

    /// Store the cart under the given key.
    fn save(&mut self, id: CartKey, cart: Cart);
}

/// In-memory catalog of items, categories and brands.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    categories: SlotMap<CategoryKey, String>,
    brands: SlotMap<BrandKey, String>,
    items: SlotMap<ItemKey, Item>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category and return its key.
    pub fn add_category(&mut self, name: impl Into<String>) -> CategoryKey {
        self.categories.insert(name.into())
    }

    /// Register a brand and return its key.
    pub fn add_brand(&mut self, name: impl Into<String>) -> BrandKey {
        self.brands.insert(name.into())
    }

    /// Add an item and return its key.
    pub fn insert(&mut self, item: Item) -> ItemKey {
        self.items.insert(item)
    }

    /// Borrow an item by key.
    pub fn item(&self, key: ItemKey) -> Option<&Item> {
        self.items.get(key)
    }

    /// A category's name, if registered.
    pub fn category_name(&self, key: CategoryKey) -> Option<&str> {
        self.categories.get(key).map(String::as_str)
    }

    /// A brand's name, if registered.
    pub fn brand_name(&self, key: BrandKey) -> Option<&str> {
        self.brands.get(key).map(String::as_str)
    }
}

impl ItemRepository for InMemoryCatalog {
    fn find_by_id(&self, id: ItemKey) -> Option<Item> {
        self.items.get(id).cloned()
    }
}

/// In-memory promotion store that preserves insertion order.
#[derive(Debug, Default)]
pub struct InMemoryPromotions {
    keys: SlotMap<PromotionKey, ()>,
    order: Vec<PromotionKey>,
    records: SecondaryMap<PromotionKey, Promotion>,
}

impl InMemoryPromotions {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a promotion and return its key.
    pub fn insert(&mut self, promotion: Promotion) -> PromotionKey {
        let key = self.keys.insert(());
        self.order.push(key);
        self.records.insert(key, promotion);
        key
    }

    /// Borrow a promotion by key.
    pub fn promotion(&self, key: PromotionKey) -> Option<&Promotion> {
        self.records.get(key)
    }
}

impl PromotionRepository for InMemoryPromotions {
    fn find_by_code(&self, code: &str) -> Option<(PromotionKey, Promotion)> {
        self.order.iter().find_map(|&key| {
            self.records
                .get(key)
                .filter(|promotion| promotion.promo_code() == Some(code))
                .map(|promotion| (key, promotion.clone()))
        })
    }

    fn find_by_id(&self, id: PromotionKey) -> Option<Promotion> {
        self.records.get(id).cloned()
    }

    fn find_active(&self, now: Timestamp) -> Vec<(PromotionKey, Promotion)> {
        self.order
            .iter()
            .filter_map(|&key| {
                self.records
                    .get(key)
                    .filter(|promotion| promotion.is_active(now))
                    .map(|promotion| (key, promotion.clone()))
            })
            .collect()
    }
}

/// In-memory cart persistence.
#[derive(Debug, Default)]
pub struct InMemoryCarts {
    carts: SlotMap<CartKey, Cart>,
}

impl InMemoryCarts {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartRepository for InMemoryCarts {
    fn create(&mut self) -> CartKey {
        self.carts.insert(Cart::new())
    }

    fn find_by_id(&self, id: CartKey) -> Option<Cart> {
        self.carts.get(id).cloned()
    }

    fn save(&mut self, id: CartKey, cart: Cart) {
        if let Some(slot) = self.carts.get_mut(id) {
            *slot = cart;
        }
    }
}
