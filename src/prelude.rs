//! Canteen prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartLedger, CartLine, CartLineKey},
    fixtures::{
        FixtureError,
        menu::{cafeteria_menu, load_menu},
        policy::load_policy,
        script::{ScriptFixture, Step},
    },
    menu::{CatalogError, Category, MenuCatalog, MenuItem, MenuItemId},
    orders::{Checkout, Order, OrderError, OrderId, OrderStatus, OrderStore},
    pricing::{DiscountTier, PricingError, PricingPolicy, PricingSummary},
    receipt::ReceiptError,
    script::{ScriptError, StepOutcome, replay},
    session::{Session, SessionError},
};
