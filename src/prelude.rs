//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartKey, CartLine, LineAmount, PromoCodeError},
    catalog::{BrandKey, CatalogError, CategoryKey, Item, ItemKey, SaleUnit},
    pricing::{LineBreakdown, PricingEngine, PricingError, PricingResult},
    promotions::{
        Promotion, PromotionError, PromotionKey, PromotionKind, Target,
        record::{PromotionConfig, PromotionRecord, TargetKind},
    },
    repositories::{
        CartRepository, InMemoryCarts, InMemoryCatalog, InMemoryPromotions, ItemRepository,
        PromotionRepository,
    },
};
