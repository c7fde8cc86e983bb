//! Session Script Fixtures
//!
//! A script is a list of steps, each one action a user could take during a session:
//!
//! ```yaml
//! steps:
//!   - action: add
//!     item: 1
//!     quantity: 2
//!   - action: checkout
//!     instructions: no sugar
//!     pickup: "12:30"
//!   - action: status
//!     order: 1
//!     status: Ready
//! ```

use std::path::Path;

use jiff::civil::Time;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, menu::MenuItemFixture, read},
    menu::MenuItemId,
    orders::{OrderId, OrderStatus},
};

/// Session script in YAML
#[derive(Debug, Deserialize)]
pub struct ScriptFixture {
    /// Steps, replayed in order
    pub steps: Vec<Step>,
}

/// One user action.
///
/// Quantities are read as plain integers so that zero reaches the replay and is rejected
/// there, like any other bad input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Add an item to the cart
    Add {
        /// Menu item id
        item: MenuItemId,

        /// Number of units
        #[serde(default = "one")]
        quantity: u32,
    },

    /// Change the quantity of the cart line at a position
    Update {
        /// Zero-based cart line position
        line: usize,

        /// New number of units
        quantity: u32,
    },

    /// Remove the cart line at a position
    Remove {
        /// Zero-based cart line position
        line: usize,
    },

    /// Place an order for the cart
    Checkout {
        /// Special instructions
        #[serde(default)]
        instructions: String,

        /// Preferred pickup time; the current time when omitted
        #[serde(default)]
        pickup: Option<Time>,
    },

    /// Change an order's status
    Status {
        /// Order number
        order: OrderId,

        /// New status
        status: OrderStatus,
    },

    /// Switch a menu item on or off
    SetAvailable {
        /// Menu item id
        item: MenuItemId,

        /// Whether the item can be ordered
        available: bool,
    },

    /// Replace the whole menu
    SaveMenu {
        /// The new menu, priced in the session currency
        items: Vec<MenuItemFixture>,
    },
}

fn one() -> u32 {
    1
}

impl ScriptFixture {
    /// Parse a script from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the text is not a valid script.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::from_yaml(&read(path.as_ref())?)
    }
}
