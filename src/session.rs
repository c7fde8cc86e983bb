//! Session
//!
//! One interactive session: the menu, the cart being built, and the orders placed so far.
//! Every operation runs to completion, and a rejected operation leaves all three exactly as
//! they were.

use std::num::NonZeroU32;

use jiff::Timestamp;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    cart::{CartError, CartLedger, CartLine, CartLineKey},
    menu::{CatalogError, MenuCatalog, MenuItem, MenuItemId},
    orders::{Checkout, Order, OrderError, OrderId, OrderStatus, OrderStore},
    pricing::{PricingError, PricingPolicy, PricingSummary},
};

/// Errors surfaced to whoever drives the session.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// Menu lookups and edits.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart edits.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Pricing the cart.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Placing and updating orders.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The pricing policy is expressed in another currency (menu currency, policy currency).
    #[error("Menu has currency {0}, but pricing policy has currency {1}")]
    PolicyCurrencyMismatch(&'static str, &'static str),
}

/// Session state.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: MenuCatalog,
    cart: CartLedger,
    orders: OrderStore,
    policy: PricingPolicy,
}

impl Session {
    /// Start a session over `catalog` with the standard pricing policy in the catalog's
    /// currency.
    #[must_use]
    pub fn new(catalog: MenuCatalog) -> Self {
        let policy = PricingPolicy::new(catalog.currency());

        Self::assemble(catalog, policy)
    }

    /// Start a session with a custom pricing policy.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PolicyCurrencyMismatch`] if the policy thresholds are not in
    /// the catalog currency.
    pub fn with_policy(catalog: MenuCatalog, policy: PricingPolicy) -> Result<Self, SessionError> {
        let menu_currency = catalog.currency();
        let policy_currency = policy.currency();

        if menu_currency != policy_currency {
            return Err(SessionError::PolicyCurrencyMismatch(
                menu_currency.iso_alpha_code,
                policy_currency.iso_alpha_code,
            ));
        }

        Ok(Self::assemble(catalog, policy))
    }

    fn assemble(catalog: MenuCatalog, policy: PricingPolicy) -> Self {
        Self {
            cart: CartLedger::new(catalog.currency()),
            orders: OrderStore::new(),
            catalog,
            policy,
        }
    }

    /// Items that can be ordered right now.
    pub fn available_menu(&self) -> impl Iterator<Item = &MenuItem> {
        self.catalog.list_available()
    }

    /// The whole menu.
    #[must_use]
    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    /// The cart being built.
    #[must_use]
    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    /// Orders placed so far.
    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Pricing policy in force.
    #[must_use]
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Currency of the session.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.catalog.currency()
    }

    /// Add `quantity` of a menu item to the cart.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ItemNotFound`] or [`CatalogError::ItemUnavailable`] if the item
    ///   cannot be ordered.
    /// - [`CartError`] if the line cannot be priced.
    #[instrument(skip_all, fields(item_id = %item_id, quantity = quantity.get()))]
    pub fn add_to_cart(
        &mut self,
        item_id: MenuItemId,
        quantity: NonZeroU32,
    ) -> Result<CartLineKey, SessionError> {
        let item = self.catalog.orderable(item_id).inspect_err(|error| {
            warn!(%error, "rejected add to cart");
        })?;

        let key = self.cart.add_line(item, quantity)?;

        info!(name = %item.name, "added to cart");

        Ok(key)
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line has been removed.
    pub fn update_cart_quantity(
        &mut self,
        key: CartLineKey,
        quantity: NonZeroU32,
    ) -> Result<&CartLine, SessionError> {
        Ok(self.cart.update_quantity(key, quantity)?)
    }

    /// Change the quantity of the cart line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if there is no such line.
    pub fn update_cart_quantity_at(
        &mut self,
        index: usize,
        quantity: NonZeroU32,
    ) -> Result<&CartLine, SessionError> {
        Ok(self.cart.update_quantity_at(index, quantity)?)
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line has already been removed.
    pub fn remove_from_cart(&mut self, key: CartLineKey) -> Result<CartLine, SessionError> {
        Ok(self.cart.remove_line(key)?)
    }

    /// Remove the cart line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if there is no such line.
    pub fn remove_from_cart_at(&mut self, index: usize) -> Result<CartLine, SessionError> {
        Ok(self.cart.remove_line_at(index)?)
    }

    /// Subtotal, discount, total and preparation estimate for the current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn summary(&self) -> Result<PricingSummary, SessionError> {
        Ok(PricingSummary::from_lines(&self.cart.snapshot(), &self.policy)?)
    }

    /// Place an order for the current cart, stamped with the current time.
    ///
    /// # Errors
    ///
    /// As for [`Session::checkout_at`].
    pub fn checkout(&mut self, checkout: Checkout) -> Result<&Order, SessionError> {
        self.checkout_at(checkout, Timestamp::now())
    }

    /// Place an order for the current cart and empty it.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: there is nothing in the cart.
    /// - [`PricingError`]: the cart cannot be priced.
    ///
    /// On error the cart and the order store are unchanged.
    #[instrument(skip_all, fields(lines = self.cart.len()))]
    pub fn checkout_at(
        &mut self,
        checkout: Checkout,
        placed_at: Timestamp,
    ) -> Result<&Order, SessionError> {
        let lines = self.cart.snapshot();
        let pricing = PricingSummary::from_lines(&lines, &self.policy)?;

        let order = self
            .orders
            .place_order(&lines, &pricing, checkout, placed_at)
            .inspect_err(|error| warn!(%error, "rejected checkout"))?;

        self.cart.clear();

        Ok(order)
    }

    /// Move an order to a new status, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::OrderNotFound`] if no order has this id.
    pub fn update_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, SessionError> {
        self.orders
            .update_status(id, status)
            .inspect_err(|error| warn!(%error, "rejected status update"))
            .map_err(SessionError::from)
    }

    /// Replace the whole menu.
    ///
    /// Lines already in the cart keep the names and prices they were added with.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the new menu is rejected; the old menu stays.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn save_menu(&mut self, items: Vec<MenuItem>) -> Result<(), SessionError> {
        self.catalog
            .replace_all(items)
            .inspect_err(|error| warn!(%error, "rejected menu save"))
            .map_err(SessionError::from)
    }

    /// Add a single item to the menu.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is taken.
    pub fn add_menu_item(&mut self, item: MenuItem) -> Result<(), SessionError> {
        Ok(self.catalog.insert(item)?)
    }

    /// Overwrite a single menu item.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ItemNotFound`] if no item has this id.
    pub fn update_menu_item(&mut self, item: MenuItem) -> Result<(), SessionError> {
        Ok(self.catalog.update(item)?)
    }

    /// Remove a single menu item.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ItemNotFound`] if no item has this id.
    pub fn remove_menu_item(&mut self, id: MenuItemId) -> Result<MenuItem, SessionError> {
        Ok(self.catalog.remove(id)?)
    }

    /// Switch a menu item on or off.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ItemNotFound`] if no item has this id.
    pub fn set_menu_item_available(
        &mut self,
        id: MenuItemId,
        available: bool,
    ) -> Result<(), SessionError> {
        Ok(self.catalog.set_available(id, available)?)
    }
}
