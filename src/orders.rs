//! Orders

use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Time};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::{cart::CartLine, pricing::PricingSummary};

/// Errors related to placing and updating orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty. Cannot place an empty order.")]
    EmptyCart,

    /// No order has this id.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
}

/// Order number, assigned in sequence from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Where an order is in the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum OrderStatus {
    /// Placed, not started
    Pending,

    /// Being made
    Preparing,

    /// Waiting for pickup
    Ready,

    /// Picked up
    Completed,

    /// Will not be made
    Cancelled,
}

impl OrderStatus {
    /// Every status, in the order staff would normally move through them.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Display name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Customer preferences captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Special instructions, may be empty
    pub instructions: String,

    /// Preferred pickup time of day
    pub pickup_time: Time,
}

impl Checkout {
    /// Checkout with no special instructions.
    #[must_use]
    pub fn pickup_at(pickup_time: Time) -> Self {
        Self {
            instructions: String::new(),
            pickup_time,
        }
    }

    /// Returns the same checkout with special instructions attached.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

/// A placed order.
///
/// Lines and pricing are frozen when the order is placed; only the status changes later.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    placed_at: Timestamp,
    lines: SmallVec<[CartLine; 4]>,
    pricing: PricingSummary,
    status: OrderStatus,
    instructions: String,
    pickup_time: Time,
}

impl Order {
    /// Order number
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Lines as they were in the cart at checkout
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Pricing as it was at checkout
    pub fn pricing(&self) -> &PricingSummary {
        &self.pricing
    }

    /// Amount payable, after discount
    pub fn total_amount(&self) -> &Money<'static, Currency> {
        &self.pricing.total
    }

    /// Current status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Special instructions, if any were given
    pub fn instructions(&self) -> Option<&str> {
        let trimmed = self.instructions.trim();

        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Preferred pickup time
    pub fn pickup_time(&self) -> Time {
        self.pickup_time
    }

    /// One-line summary such as `Coffee (x2), Tea (x1)`.
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{} (x{})", line.name(), line.quantity()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Order store.
///
/// Append-only; orders are never removed and ids are never reused.
#[derive(Debug, Clone)]
pub struct OrderStore {
    orders: Vec<Order>,
    next_id: u64,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    /// Create an empty store; the first order will be #1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            next_id: 1,
        }
    }

    /// Freeze a cart snapshot and its pricing into a new pending order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] if `lines` is empty; the id counter is not advanced.
    pub fn place_order(
        &mut self,
        lines: &[CartLine],
        pricing: &PricingSummary,
        checkout: Checkout,
        placed_at: Timestamp,
    ) -> Result<&Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let id = OrderId(self.next_id);

        self.next_id += 1;

        info!(order_id = %id, total = %pricing.total, lines = lines.len(), "order placed");

        self.orders.push(Order {
            id,
            placed_at,
            lines: lines.iter().cloned().collect(),
            pricing: pricing.clone(),
            status: OrderStatus::Pending,
            instructions: checkout.instructions,
            pickup_time: checkout.pickup_time,
        });

        self.orders.last().ok_or(OrderError::OrderNotFound(id))
    }

    /// Set the status of an order, returning the previous status.
    ///
    /// Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::OrderNotFound`] if no order has this id.
    pub fn update_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, OrderError> {
        let order = self
            .orders
            .binary_search_by_key(&id, Order::id)
            .ok()
            .and_then(|position| self.orders.get_mut(position))
            .ok_or(OrderError::OrderNotFound(id))?;

        let previous = std::mem::replace(&mut order.status, status);

        info!(order_id = %id, from = %previous, to = %status, "order status updated");

        Ok(previous)
    }

    /// Look up an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders
            .binary_search_by_key(&id, Order::id)
            .ok()
            .and_then(|position| self.orders.get(position))
    }

    /// Every order, oldest first.
    pub fn list(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Id the next placed order will receive.
    #[must_use]
    pub fn next_id(&self) -> OrderId {
        OrderId(self.next_id)
    }

    /// Number of orders placed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no orders have been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
