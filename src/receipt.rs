//! Receipt
//!
//! Terminal rendering for the menu, the cart with its pricing summary, and placed orders.

use std::io;

use jiff::tz::TimeZone;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLine,
    menu::MenuItem,
    orders::Order,
    pricing::{DiscountTier, PricingSummary, percent_points},
};

const BOLD: &str = "\x1b[1m";
const DARK_GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Write the menu as a table.
///
/// Unavailable items are shown dimmed so a full catalog listing stays readable.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if the output cannot be written.
pub fn write_menu<'a>(
    mut out: impl io::Write,
    items: impl IntoIterator<Item = &'a MenuItem>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    let mut dimmed_rows = Vec::new();

    builder.push_record(["ID", "Item", "Category", "Price"]);

    for (idx, item) in items.into_iter().enumerate() {
        builder.push_record([
            item.id.to_string(),
            item.name.clone(),
            item.category.to_string(),
            item.price.to_string(),
        ]);

        if !item.available {
            dimmed_rows.push(idx + 1);
        }
    }

    let mut table = builder.build();

    table.with(theme());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    for row in dimmed_rows {
        table.modify(Rows::new(row..=row), dimmed());
    }

    writeln!(out, "\n{}", dim_borders(&table.to_string())).map_err(|_err| ReceiptError::IO)
}

/// Write cart lines followed by their pricing summary.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if the output cannot be written.
pub fn write_cart<'a>(
    mut out: impl io::Write,
    lines: impl IntoIterator<Item = &'a CartLine>,
    summary: &PricingSummary,
) -> Result<(), ReceiptError> {
    if summary.line_count == 0 {
        return writeln!(out, "\nYour cart is empty.\n").map_err(|_err| ReceiptError::IO);
    }

    write_lines_table(&mut out, lines)?;
    write_summary(&mut out, summary)
}

/// Write a single order: its lines, pricing and pickup details.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if the output cannot be written.
pub fn write_order(mut out: impl io::Write, order: &Order) -> Result<(), ReceiptError> {
    writeln!(
        out,
        "\n{BOLD}Order {}{RESET}  {}  pickup {}",
        order.id(),
        order.status(),
        order.pickup_time().strftime("%H:%M")
    )
    .map_err(|_err| ReceiptError::IO)?;

    if let Some(instructions) = order.instructions() {
        writeln!(out, "Instructions: {instructions}").map_err(|_err| ReceiptError::IO)?;
    }

    write_lines_table(&mut out, order.lines())?;
    write_summary(&mut out, order.pricing())
}

/// Write the order history as a table, oldest first.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if the output cannot be written.
pub fn write_orders<'a>(
    mut out: impl io::Write,
    orders: impl IntoIterator<Item = &'a Order>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    let local = TimeZone::system();

    builder.push_record(["Order", "Placed", "Items", "Total", "Status"]);

    for order in orders {
        builder.push_record([
            order.id().to_string(),
            placed_in(order, &local),
            order.items_summary(),
            order.total_amount().to_string(),
            order.status().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(theme());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "\n{}", dim_borders(&table.to_string())).map_err(|_err| ReceiptError::IO)
}

/// Placement time on the clock of `tz`; pickup times are local, so history uses local too.
fn placed_in(order: &Order, tz: &TimeZone) -> String {
    order
        .placed_at()
        .to_zoned(tz.clone())
        .strftime("%Y-%m-%d %H:%M")
        .to_string()
}

fn write_lines_table<'a>(
    out: &mut impl io::Write,
    lines: impl IntoIterator<Item = &'a CartLine>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Qty", "Unit Price", "Subtotal"]);

    for (idx, line) in lines.into_iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            line.name().to_string(),
            line.quantity().to_string(),
            line.unit_price().to_string(),
            line.subtotal().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(theme());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());
    table.modify(Columns::first(), dimmed());

    writeln!(out, "\n{}", dim_borders(&table.to_string())).map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, summary: &PricingSummary) -> Result<(), ReceiptError> {
    let savings = match summary.tier {
        DiscountTier::None => "-".to_string(),
        tier => format!(
            "{} ({:.2}%) -{}",
            tier.label(),
            percent_points(summary.savings_percent()),
            summary.discount
        ),
    };

    let rows = [
        ("Subtotal:", summary.subtotal.to_string(), false),
        ("Savings:", savings, false),
        ("Total:", summary.total.to_string(), true),
        ("Ready in:", format!("~{} min", summary.estimated_prep_minutes), false),
    ];

    let label_width = rows
        .iter()
        .map(|(label, ..)| label.chars().count())
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value, _)| value.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value, bold) in &rows {
        let (on, off) = if *bold { (BOLD, RESET) } else { ("", "") };

        writeln!(out, " {on}{label:>label_width$}{off}  {on}{value:>value_width$}{off}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

fn theme() -> Theme {
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    theme
}

fn is_border(ch: char) -> bool {
    matches!(ch, '\u{2500}'..='\u{257F}')
}

/// Dims each run of box-drawing characters; cell text keeps its own colour.
fn dim_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len());
    let mut chars = table.chars().peekable();

    while let Some(ch) = chars.next() {
        if !is_border(ch) {
            out.push(ch);
            continue;
        }

        out.push_str(DARK_GREY);
        out.push(ch);

        while let Some(next) = chars.next_if(|c| is_border(*c)) {
            out.push(next);
        }

        out.push_str(RESET);
    }

    out
}

fn dimmed() -> Color {
    Color::new(DARK_GREY, RESET)
}
