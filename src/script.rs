//! Script replay
//!
//! Drives a [`Session`] through a list of scripted steps. A rejected step is reported and
//! the replay carries on, the same way a user would correct their input and try again.

use std::num::NonZeroU32;

use jiff::Zoned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    fixtures::{FixtureError, menu::items_in, script::Step},
    orders::Checkout,
    session::{Session, SessionError},
};

/// Reasons a scripted step was rejected.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Quantities must be at least one.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// The session rejected the action.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A menu in the script could not be read.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// What happened when one step was replayed.
#[derive(Debug)]
pub struct StepOutcome {
    /// One-based step number
    pub step: usize,

    /// Success message, or the reason the step was rejected
    pub result: Result<String, ScriptError>,
}

impl StepOutcome {
    /// Whether the step was applied.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Replay every step against `session`, in order.
pub fn replay(session: &mut Session, steps: &[Step]) -> Vec<StepOutcome> {
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let result = apply(session, step);

            match &result {
                Ok(message) => debug!(step = idx + 1, %message, "step applied"),
                Err(error) => warn!(step = idx + 1, %error, "step rejected"),
            }

            StepOutcome {
                step: idx + 1,
                result,
            }
        })
        .collect()
}

/// Apply a single step.
///
/// # Errors
///
/// Returns a [`ScriptError`] if the step is rejected; the session is then unchanged.
pub fn apply(session: &mut Session, step: &Step) -> Result<String, ScriptError> {
    match step {
        Step::Add { item, quantity } => {
            let quantity = quantity_from(*quantity)?;
            let key = session.add_to_cart(*item, quantity)?;
            let name = session
                .cart()
                .get(key)
                .map_or_else(|| item.to_string(), |line| line.name().to_string());

            Ok(format!("Added {quantity} x {name} to cart!"))
        }
        Step::Update { line, quantity } => {
            let quantity = quantity_from(*quantity)?;
            let updated = session.update_cart_quantity_at(*line, quantity)?;

            Ok(format!(
                "{} quantity set to {quantity} ({})",
                updated.name(),
                updated.subtotal()
            ))
        }
        Step::Remove { line } => {
            let removed = session.remove_from_cart_at(*line)?;

            Ok(format!("Removed {} from cart", removed.name()))
        }
        Step::Checkout {
            instructions,
            pickup,
        } => {
            let pickup_time = pickup.unwrap_or_else(|| Zoned::now().time());
            let checkout = Checkout::pickup_at(pickup_time)
                .with_instructions(instructions.clone());

            let order = session.checkout(checkout)?;

            Ok(format!(
                "Order {} placed successfully! Total {}, ready in about {} minutes",
                order.id(),
                order.total_amount(),
                order.pricing().estimated_prep_minutes
            ))
        }
        Step::Status { order, status } => {
            session.update_order_status(*order, *status)?;

            Ok(format!("Status for Order {order} updated to '{status}'."))
        }
        Step::SetAvailable { item, available } => {
            session.set_menu_item_available(*item, *available)?;

            let state = if *available { "available" } else { "unavailable" };

            Ok(format!("Menu item {item} is now {state}"))
        }
        Step::SaveMenu { items } => {
            let items = items_in(items.clone(), session.currency())?;

            session.save_menu(items)?;

            Ok("Menu updated successfully!".to_string())
        }
    }
}

fn quantity_from(quantity: u32) -> Result<NonZeroU32, ScriptError> {
    NonZeroU32::new(quantity).ok_or(ScriptError::ZeroQuantity)
}
