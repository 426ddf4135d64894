//! Receipt
//!
//! Plain-text rendering of a [`PricingResult`], one row per cart line plus a
//! subtotal/discount/total summary.

use std::fmt::Write;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{
    cart::LineAmount,
    pricing::{LineBreakdown, PricingResult},
};

/// Render a pricing result as a table followed by the totals.
pub fn render(result: &PricingResult) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Amount", "Base", "Discount", "Total", "Promotion"]);

    for line in &result.items {
        builder.push_record(line_row(line));
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());

    let mut out = table.to_string();
    out.push('\n');

    // Infallible for String, but keep the unused result explicit.
    let _ = writeln!(out, "Subtotal: {}", result.subtotal);
    let _ = writeln!(out, "Discount: {}", result.total_discount);
    let _ = write!(out, "Total: {}", result.total);

    out
}

fn line_row(line: &LineBreakdown) -> [String; 6] {
    [
        line.item_name.clone(),
        format_amount(line.amount),
        line.base_price.to_string(),
        line.discount.to_string(),
        line.final_price.to_string(),
        line.promotion.clone().unwrap_or_default(),
    ]
}

fn format_amount(amount: LineAmount) -> String {
    match amount {
        LineAmount::Quantity(quantity) => format!("x{quantity}"),
        LineAmount::Weight(weight) => format!("{weight} wt"),
    }
}
