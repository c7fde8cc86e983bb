//! Canteen
//!
//! Ordering core for a small cafeteria: a menu catalog, a cart, tiered discount pricing with a
//! preparation time estimate, and an append-only order store with status tracking. A
//! [`session::Session`] ties the four together for one user.

pub mod cart;
pub mod fixtures;
pub mod menu;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod script;
pub mod session;
