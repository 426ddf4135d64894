//! Tally
//!
//! Tally is a cart pricing and promotions engine. It prices a shopping cart
//! against a catalog of sale items and a set of time-bounded promotional
//! discount rules, selecting the single best applicable discount per cart
//! line and producing a subtotal/discount/total breakdown.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod repositories;
