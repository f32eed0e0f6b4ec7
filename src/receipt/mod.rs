//! Receipt
//!
//! The priced outcome of a checkout, and its terminal rendering.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
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
    coupons::{CouponCode, CouponDiscount},
    pricing::{PricingError, line_total, total_price},
    products::ProductKey,
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Wrapper for pricing errors.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product key in the storefront catalog
    pub product: ProductKey,

    /// Product name
    pub name: String,

    /// Selected variant name
    pub variant: Option<String>,

    /// Units purchased
    pub quantity: u32,

    /// Customer price list entry per unit, ignoring promotions
    pub list_price: Money<'a, Currency>,

    /// Price paid per unit
    pub unit_price: Money<'a, Currency>,

    /// `unit_price * quantity`
    pub line_total: Money<'a, Currency>,

    /// Whether a promotional price applied
    pub promotional: bool,

    /// Whether the applied coupon covers this line
    pub coupon_eligible: bool,
}

impl<'a> ReceiptLine<'a> {
    /// Amount saved on this line against the list price.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the arithmetic fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, ReceiptError> {
        let per_unit = self.list_price.sub(self.unit_price)?;

        Ok(line_total(per_unit, self.quantity)?)
    }
}

/// A coupon applied to the order.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon<'a> {
    /// Coupon code
    pub code: CouponCode,

    /// Coupon type name
    pub kind: &'static str,

    /// Amounts discounted
    pub discount: CouponDiscount<'a>,
}

/// Final receipt for a checked-out cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    shipping_method: String,
    shipping: Money<'a, Currency>,
    coupon: Option<AppliedCoupon<'a>>,
    total: Money<'a, Currency>,
    reward_points: u64,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt, deriving the subtotal and total from the lines.
    ///
    /// `total = subtotal - item discount + shipping - shipping discount`
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if any amount uses another currency.
    pub fn new(
        lines: impl Into<SmallVec<[ReceiptLine<'a>; 8]>>,
        shipping_method: impl Into<String>,
        shipping: Money<'a, Currency>,
        coupon: Option<AppliedCoupon<'a>>,
        reward_points: u64,
        currency: &'static Currency,
    ) -> Result<Self, ReceiptError> {
        let lines = lines.into();
        let subtotal = total_price(lines.iter().map(|line| line.line_total), currency)?;

        let mut total = subtotal.add(shipping)?;

        if let Some(coupon) = &coupon {
            total = total
                .sub(coupon.discount.items())?
                .sub(coupon.discount.shipping())?;
        }

        Ok(Self {
            lines,
            subtotal,
            shipping_method: shipping_method.into(),
            shipping,
            coupon,
            total,
            reward_points,
            currency,
        })
    }

    /// Priced lines, in cart order
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Sum of line totals
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Shipping method name
    #[must_use]
    pub fn shipping_method(&self) -> &str {
        &self.shipping_method
    }

    /// Shipping cost before any coupon
    #[must_use]
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Applied coupon, if any
    #[must_use]
    pub fn coupon(&self) -> Option<&AppliedCoupon<'a>> {
        self.coupon.as_ref()
    }

    /// Total coupon discount (items and shipping).
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the discount amounts use different currencies.
    pub fn discount(&self) -> Result<Money<'a, Currency>, MoneyError> {
        match &self.coupon {
            Some(coupon) => coupon.discount.total(),
            None => Ok(Money::from_minor(0, self.currency)),
        }
    }

    /// Amount to pay
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Reward points earned
    #[must_use]
    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }

    /// Currency used for all monetary values
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Promotional savings against list prices plus the coupon discount.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the arithmetic fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, ReceiptError> {
        let promotional = self
            .lines
            .iter()
            .map(ReceiptLine::savings)
            .collect::<Result<SmallVec<[_; 8]>, _>>()?;

        Ok(total_price(promotional, self.currency)?.add(self.discount()?)?)
    }

    /// Savings as a fraction of what the order would have cost at list prices.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the arithmetic fails.
    pub fn savings_percent(&self) -> Result<Percentage, ReceiptError> {
        let savings_minor = self.savings()?.to_minor_units();
        let full_minor = self.total.to_minor_units().saturating_add(savings_minor);

        if full_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let full_dec = Decimal::from_i64(full_minor).unwrap_or(Decimal::ONE);

        Ok(Percentage::from(savings_dec / full_dec))
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();
        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = SmallVec::new();

        builder.push_record([
            "",
            "Item",
            "Qty",
            "List Price",
            "Unit Price",
            "Line Total",
            "Notes",
        ]);

        for (idx, line) in self.lines.iter().enumerate() {
            let row = idx + 1; // header is row 0

            let name = match &line.variant {
                Some(variant) => format!("{} ({variant})", line.name),
                None => line.name.clone(),
            };

            let mut notes: SmallVec<[&str; 2]> = SmallVec::new();

            if line.promotional {
                notes.push("promo");
            }

            if line.coupon_eligible {
                notes.push("coupon");
            }

            builder.push_record([
                format!("#{row:<3}"),
                name,
                line.quantity.to_string(),
                format!("{}", line.list_price),
                format!("{}", line.unit_price),
                format!("{}", line.line_total),
                notes.join(", "),
            ]);

            color_ops.push((row, 3, color_dark_grey()));

            if line.promotional {
                color_ops.push((row, 4, Color::FG_GREEN));
            }
        }

        write_table(&mut out, builder, color_ops)?;
        write_summary(&mut out, self)
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let savings = receipt.savings()?;
    let savings_percent_points = percent_points_from_fractional_percentage(receipt.savings_percent()?);

    let mut rows: SmallVec<[(String, String); 6]> = SmallVec::new();

    rows.push((" Subtotal:".to_string(), format!("{}  ", receipt.subtotal())));
    rows.push((
        format!(" Shipping ({}):", receipt.shipping_method()),
        format!("{}  ", receipt.shipping()),
    ));

    if let Some(coupon) = receipt.coupon() {
        rows.push((
            format!(" Coupon {}:", coupon.code),
            format!("-{}  ", receipt.discount()?),
        ));
    }

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", receipt.total()),
    ));
    rows.push((
        " Savings:".to_string(),
        format!("({savings_percent_points:.2}%) {savings}  "),
    ));
    rows.push((
        " Reward points:".to_string(),
        format!("{}  ", receipt.reward_points()),
    ));

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points_from_fractional_percentage(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
