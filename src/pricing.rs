//! Pricing
//!
//! Subtotals, the two discount tiers, and the preparation time estimate. Everything here is
//! a pure function of a cart snapshot and a [`PricingPolicy`]; amounts are summed in minor
//! units and percentages are applied in decimal space, so tier thresholds compare exactly.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;
use tracing::debug;

use crate::cart::CartLine;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line's currency differs from the policy currency (line currency, policy currency).
    #[error("Line has currency {0}, but pricing policy has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Discount tiers and preparation time constants.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    /// Subtotals strictly above this amount get the large order rate
    pub large_order_threshold: Money<'static, Currency>,

    /// Discount rate for large orders
    pub large_order_rate: Percentage,

    /// Carts with at least this many lines get the multi-line rate
    pub multi_line_min_lines: usize,

    /// Discount rate for carts with many lines
    pub multi_line_rate: Percentage,

    /// Minutes every order takes, however small
    pub base_prep_minutes: u32,

    /// Extra minutes per unit ordered
    pub prep_minutes_per_unit: u32,
}

impl PricingPolicy {
    /// The standard cafeteria policy, priced in `currency`.
    ///
    /// 10% off above 500.00, otherwise 5% off for three or more lines; 10 minutes plus
    /// 2 per unit to prepare.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            large_order_threshold: Money::from_major(500, currency),
            large_order_rate: Percentage::from(Decimal::new(10, 2)),
            multi_line_min_lines: 3,
            multi_line_rate: Percentage::from(Decimal::new(5, 2)),
            base_prep_minutes: 10,
            prep_minutes_per_unit: 2,
        }
    }

    /// Currency the policy thresholds are expressed in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.large_order_threshold.currency()
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(iso::INR)
    }
}

/// Which discount rule applied to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountTier {
    /// No discount
    None,

    /// Subtotal above the large order threshold
    LargeOrder,

    /// Enough separate lines in the cart
    MultiLine,
}

impl DiscountTier {
    /// Select the tier for a cart.
    ///
    /// The large order tier wins whenever it applies, even if the line count would also
    /// qualify. The tiers never stack.
    #[must_use]
    pub fn select(
        subtotal: &Money<'_, Currency>,
        line_count: usize,
        policy: &PricingPolicy,
    ) -> Self {
        if subtotal.to_minor_units() > policy.large_order_threshold.to_minor_units() {
            DiscountTier::LargeOrder
        } else if line_count >= policy.multi_line_min_lines {
            DiscountTier::MultiLine
        } else {
            DiscountTier::None
        }
    }

    /// Discount rate for this tier under `policy`.
    #[must_use]
    pub fn rate(self, policy: &PricingPolicy) -> Percentage {
        match self {
            DiscountTier::None => Percentage::from(Decimal::ZERO),
            DiscountTier::LargeOrder => policy.large_order_rate,
            DiscountTier::MultiLine => policy.multi_line_rate,
        }
    }

    /// Short label for receipts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DiscountTier::None => "No discount",
            DiscountTier::LargeOrder => "Large order",
            DiscountTier::MultiLine => "Multi-item",
        }
    }
}

/// Sum of all line subtotals, zero for an empty cart.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: a line is priced in another currency.
/// - [`PricingError::Money`]: money arithmetic overflowed.
pub fn subtotal(
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            let line_currency = line.subtotal().currency();

            if line_currency != currency {
                return Err(PricingError::CurrencyMismatch(
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            Ok(acc.add(*line.subtotal())?)
        })
}

/// Discount for a cart under `policy`.
///
/// # Errors
///
/// Returns a [`PricingError`] if the subtotal cannot be computed or the percentage cannot
/// be applied.
pub fn discount(
    lines: &[CartLine],
    policy: &PricingPolicy,
) -> Result<Money<'static, Currency>, PricingError> {
    Ok(PricingSummary::from_lines(lines, policy)?.discount)
}

/// Subtotal minus discount.
///
/// # Errors
///
/// Returns a [`PricingError`] as for [`discount`].
pub fn final_amount(
    lines: &[CartLine],
    policy: &PricingPolicy,
) -> Result<Money<'static, Currency>, PricingError> {
    Ok(PricingSummary::from_lines(lines, policy)?.total)
}

/// Base time plus time per unit, in minutes.
///
/// Defined for an empty cart too, where it is just the base time.
pub fn estimated_prep_minutes(lines: &[CartLine], policy: &PricingPolicy) -> u64 {
    let units: u64 = lines
        .iter()
        .map(|line| u64::from(line.quantity().get()))
        .sum();

    u64::from(policy.prep_minutes_per_unit)
        .saturating_mul(units)
        .saturating_add(u64::from(policy.base_prep_minutes))
}

/// Pricing figures for one cart, as shown before checkout and frozen into an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSummary {
    /// Sum of line subtotals
    pub subtotal: Money<'static, Currency>,

    /// Amount taken off the subtotal
    pub discount: Money<'static, Currency>,

    /// Rule that produced the discount
    pub tier: DiscountTier,

    /// Amount payable
    pub total: Money<'static, Currency>,

    /// Number of cart lines
    pub line_count: usize,

    /// Sum of quantities
    pub unit_count: u64,

    /// Estimated minutes until the order is ready
    pub estimated_prep_minutes: u64,
}

impl PricingSummary {
    /// Price a cart snapshot.
    ///
    /// # Errors
    ///
    /// - [`PricingError::CurrencyMismatch`]: a line is priced in another currency.
    /// - [`PricingError::PercentConversion`]: the discount could not be represented.
    /// - [`PricingError::Money`]: money arithmetic overflowed.
    pub fn from_lines(lines: &[CartLine], policy: &PricingPolicy) -> Result<Self, PricingError> {
        let currency = policy.currency();
        let subtotal = subtotal(lines, currency)?;
        let tier = DiscountTier::select(&subtotal, lines.len(), policy);

        let discount_minor = percent_of_minor(tier.rate(policy), subtotal.to_minor_units())?;
        let discount = Money::from_minor(discount_minor, currency);
        let total = subtotal.sub(discount)?;

        let unit_count = lines
            .iter()
            .map(|line| u64::from(line.quantity().get()))
            .sum();

        debug!(
            subtotal = %subtotal,
            discount = %discount,
            total = %total,
            tier = tier.label(),
            "priced cart"
        );

        Ok(Self {
            subtotal,
            discount,
            tier,
            total,
            line_count: lines.len(),
            unit_count,
            estimated_prep_minutes: estimated_prep_minutes(lines, policy),
        })
    }

    /// Discount as a fraction of the subtotal; zero for an empty cart.
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(Decimal::ZERO);
        }

        let discount_dec =
            Decimal::from_i64(self.discount.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

        Percentage::from(discount_dec / subtotal_dec)
    }
}

/// Converts a fractional percentage to percent points for display.
#[must_use]
pub fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Apply a percentage to an amount in minor units, rounding half away from zero.
fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    (percent * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}
