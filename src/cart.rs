//! Cart

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::menu::{MenuItem, MenuItemId};

new_key_type! {
    /// Stable handle to a cart line, valid until that line is removed.
    pub struct CartLineKey;
}

/// Errors related to cart edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A position-based edit named a line that does not exist.
    #[error("Cart line {0} does not exist")]
    InvalidIndex(usize),

    /// A key-based edit named a line that has since been removed.
    #[error("Cart line no longer exists")]
    LineNotFound(CartLineKey),

    /// An item's currency differs from the cart currency (item id, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(MenuItemId, &'static str, &'static str),

    /// Unit price times quantity does not fit in minor units.
    #[error("Line total for item {0} is too large")]
    Overflow(MenuItemId),
}

/// One menu item and a chosen quantity, priced when it was added.
///
/// Name and unit price are copied from the menu, so later menu edits do not reach lines
/// already in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    item_id: MenuItemId,
    name: String,
    unit_price: Money<'static, Currency>,
    quantity: NonZeroU32,
    subtotal: Money<'static, Currency>,
}

impl CartLine {
    /// Price a line for `quantity` units of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the line total cannot be represented.
    pub fn new(item: &MenuItem, quantity: NonZeroU32) -> Result<Self, CartError> {
        let subtotal = line_subtotal(item.id, &item.price, quantity)?;

        Ok(Self {
            item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
            subtotal,
        })
    }

    /// Menu item this line was created from
    pub fn item_id(&self) -> MenuItemId {
        self.item_id
    }

    /// Item name at the time the line was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price at the time the line was added
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    /// Unit price times quantity
    pub fn subtotal(&self) -> &Money<'static, Currency> {
        &self.subtotal
    }

    fn set_quantity(&mut self, quantity: NonZeroU32) -> Result<(), CartError> {
        self.subtotal = line_subtotal(self.item_id, &self.unit_price, quantity)?;
        self.quantity = quantity;

        Ok(())
    }
}

fn line_subtotal(
    item_id: MenuItemId,
    unit_price: &Money<'static, Currency>,
    quantity: NonZeroU32,
) -> Result<Money<'static, Currency>, CartError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity.get()))
        .ok_or(CartError::Overflow(item_id))?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Cart ledger.
///
/// Lines keep the order they were added in. Adding the same item twice produces two lines.
#[derive(Debug, Clone)]
pub struct CartLedger {
    lines: SlotMap<CartLineKey, CartLine>,
    order: Vec<CartLineKey>,
    currency: &'static Currency,
}

impl CartLedger {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: SlotMap::with_key(),
            order: Vec::new(),
            currency,
        }
    }

    /// Append a new line for `quantity` units of `item`.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the item is priced in another currency.
    /// - [`CartError::Overflow`]: the line total cannot be represented.
    pub fn add_line(
        &mut self,
        item: &MenuItem,
        quantity: NonZeroU32,
    ) -> Result<CartLineKey, CartError> {
        let item_currency = item.price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item.id,
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let line = CartLine::new(item, quantity)?;
        let key = self.lines.insert(line);

        self.order.push(key);

        debug!(item_id = %item.id, quantity = quantity.get(), "cart line added");

        Ok(key)
    }

    /// Change the quantity of a line, recomputing its subtotal.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: the line has been removed.
    /// - [`CartError::Overflow`]: the new line total cannot be represented.
    pub fn update_quantity(
        &mut self,
        key: CartLineKey,
        quantity: NonZeroU32,
    ) -> Result<&CartLine, CartError> {
        let line = self
            .lines
            .get_mut(key)
            .ok_or(CartError::LineNotFound(key))?;

        line.set_quantity(quantity)?;

        Ok(line)
    }

    /// Change the quantity of the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if there is no such line, or
    /// [`CartError::Overflow`] as for [`CartLedger::update_quantity`].
    pub fn update_quantity_at(
        &mut self,
        index: usize,
        quantity: NonZeroU32,
    ) -> Result<&CartLine, CartError> {
        let key = self.key_at(index)?;

        self.update_quantity(key, quantity)
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line has already been removed.
    pub fn remove_line(&mut self, key: CartLineKey) -> Result<CartLine, CartError> {
        let line = self.lines.remove(key).ok_or(CartError::LineNotFound(key))?;

        self.order.retain(|existing| *existing != key);

        debug!(item_id = %line.item_id, "cart line removed");

        Ok(line)
    }

    /// Remove the line at `index`; later lines shift down by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if there is no such line.
    pub fn remove_line_at(&mut self, index: usize) -> Result<CartLine, CartError> {
        let key = self.key_at(index)?;

        self.remove_line(key)
    }

    /// Key of the line currently at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if there is no such line.
    pub fn key_at(&self, index: usize) -> Result<CartLineKey, CartError> {
        self.order
            .get(index)
            .copied()
            .ok_or(CartError::InvalidIndex(index))
    }

    /// Look up a line by key.
    #[must_use]
    pub fn get(&self, key: CartLineKey) -> Option<&CartLine> {
        self.lines.get(key)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.order.clear();
    }

    /// Iterate over lines and their keys, in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = (CartLineKey, &CartLine)> {
        self.order
            .iter()
            .filter_map(|key| self.lines.get(*key).map(|line| (*key, line)))
    }

    /// Iterate over lines in the order they were added.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.iter().map(|(_key, line)| line)
    }

    /// Owned copy of every line, in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines().cloned().collect()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines().map(|line| u64::from(line.quantity.get())).sum()
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{INR, USD};
    use testresult::TestResult;

    use crate::menu::Category;

    use super::*;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
    }

    fn coffee() -> MenuItem {
        MenuItem::new(MenuItemId(1), "Coffee", Category::Beverage, Money::from_minor(5000, INR))
    }

    fn tea() -> MenuItem {
        MenuItem::new(MenuItemId(2), "Tea", Category::Beverage, Money::from_minor(4000, INR))
    }

    #[test]
    fn add_line_snapshots_price_and_computes_subtotal() -> TestResult {
        let mut cart = CartLedger::new(INR);

        let key = cart.add_line(&coffee(), qty(2))?;
        let line = cart.get(key).ok_or("missing line")?;

        assert_eq!(line.name(), "Coffee");
        assert_eq!(line.unit_price(), &Money::from_minor(5000, INR));
        assert_eq!(line.subtotal(), &Money::from_minor(10000, INR));

        Ok(())
    }

    #[test]
    fn same_item_twice_makes_two_lines() -> TestResult {
        let mut cart = CartLedger::new(INR);

        cart.add_line(&coffee(), qty(1))?;
        cart.add_line(&coffee(), qty(3))?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.unit_count(), 4);

        Ok(())
    }

    #[test]
    fn later_menu_changes_do_not_reach_cart() -> TestResult {
        let mut cart = CartLedger::new(INR);
        let mut item = coffee();

        let key = cart.add_line(&item, qty(1))?;

        item.price = Money::from_minor(9900, INR);
        item.name = "Filter Coffee".to_string();

        let line = cart.get(key).ok_or("missing line")?;

        assert_eq!(line.name(), "Coffee");
        assert_eq!(line.subtotal(), &Money::from_minor(5000, INR));

        Ok(())
    }

    #[test]
    fn update_quantity_recomputes_subtotal() -> TestResult {
        let mut cart = CartLedger::new(INR);
        let key = cart.add_line(&tea(), qty(1))?;

        for n in [1, 2, 7, 250] {
            let line = cart.update_quantity(key, qty(n))?;

            assert_eq!(line.quantity(), qty(n));
            assert_eq!(
                line.subtotal().to_minor_units(),
                line.unit_price().to_minor_units() * i64::from(n)
            );
        }

        Ok(())
    }

    #[test]
    fn positional_edits_reject_out_of_range() -> TestResult {
        let mut cart = CartLedger::new(INR);
        cart.add_line(&coffee(), qty(1))?;

        assert_eq!(
            cart.update_quantity_at(1, qty(2)).err(),
            Some(CartError::InvalidIndex(1))
        );
        assert_eq!(cart.remove_line_at(5).err(), Some(CartError::InvalidIndex(5)));
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn remove_line_at_shifts_later_lines_down() -> TestResult {
        let mut cart = CartLedger::new(INR);
        cart.add_line(&coffee(), qty(1))?;
        cart.add_line(&tea(), qty(1))?;

        let removed = cart.remove_line_at(0)?;

        assert_eq!(removed.name(), "Coffee");
        assert_eq!(cart.key_at(0).map(|key| cart.get(key).map(CartLine::name))?, Some("Tea"));
        assert_eq!(cart.key_at(1), Err(CartError::InvalidIndex(1)));

        Ok(())
    }

    #[test]
    fn keys_stay_valid_across_other_removals() -> TestResult {
        let mut cart = CartLedger::new(INR);
        let first = cart.add_line(&coffee(), qty(1))?;
        let second = cart.add_line(&tea(), qty(1))?;

        cart.remove_line(first)?;
        cart.update_quantity(second, qty(4))?;

        assert_eq!(
            cart.get(second).map(CartLine::subtotal),
            Some(&Money::from_minor(16000, INR))
        );
        assert_eq!(
            cart.remove_line(first).err(),
            Some(CartError::LineNotFound(first))
        );

        Ok(())
    }

    #[test]
    fn removed_slot_reuse_keeps_insertion_order() -> TestResult {
        let mut cart = CartLedger::new(INR);
        let first = cart.add_line(&coffee(), qty(1))?;
        cart.add_line(&tea(), qty(1))?;

        cart.remove_line(first)?;
        cart.add_line(&coffee(), qty(2))?;

        let names: Vec<&str> = cart.lines().map(CartLine::name).collect();

        assert_eq!(names, vec!["Tea", "Coffee"]);

        Ok(())
    }

    #[test]
    fn add_line_rejects_foreign_currency() {
        let mut cart = CartLedger::new(INR);
        let mut item = coffee();
        item.price = Money::from_minor(100, USD);

        assert_eq!(
            cart.add_line(&item, qty(1)).err(),
            Some(CartError::CurrencyMismatch(MenuItemId(1), "USD", "INR"))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn overflowing_quantity_is_rejected_and_line_kept() -> TestResult {
        let mut cart = CartLedger::new(INR);
        let mut item = coffee();
        item.price = Money::from_minor(i64::MAX / 2, INR);

        let key = cart.add_line(&item, qty(1))?;

        assert_eq!(
            cart.update_quantity(key, qty(3)).err(),
            Some(CartError::Overflow(MenuItemId(1)))
        );
        assert_eq!(cart.get(key).map(CartLine::quantity), Some(qty(1)));

        Ok(())
    }

    #[test]
    fn clear_and_snapshot() -> TestResult {
        let mut cart = CartLedger::new(INR);
        cart.add_line(&coffee(), qty(2))?;
        cart.add_line(&tea(), qty(1))?;

        let snapshot = cart.snapshot();
        cart.clear();

        assert_eq!(snapshot.len(), 2);
        assert!(cart.is_empty());
        assert_eq!(cart.unit_count(), 0);

        Ok(())
    }
}
