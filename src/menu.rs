//! Menu

use std::{fmt, str::FromStr};

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised when committing changes to the menu catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two or more items share the same id.
    #[error("Item IDs must be unique")]
    DuplicateId,

    /// No item with this id exists in the catalog.
    #[error("Menu item {0} not found")]
    ItemNotFound(MenuItemId),

    /// The item exists but is currently switched off.
    #[error("Menu item {0} is not available")]
    ItemUnavailable(MenuItemId),

    /// An item's currency differs from the catalog currency (item id, item currency, catalog currency).
    #[error("Menu item {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(MenuItemId, &'static str, &'static str),

    /// An item was priced below zero.
    #[error("Menu item {0} has a negative price")]
    NegativePrice(MenuItemId),
}

/// Menu item identifier, as typed by whoever maintains the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(pub u32);

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MenuItemId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Menu category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    /// Drinks
    Beverage,

    /// Light bites
    Snack,

    /// Full meals
    Meal,

    /// Accompaniments
    Side,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 4] = [
        Category::Beverage,
        Category::Snack,
        Category::Meal,
        Category::Side,
    ];

    /// Display name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Beverage => "Beverage",
            Category::Snack => "Snack",
            Category::Meal => "Meal",
            Category::Side => "Side",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A single entry on the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Item id, unique within a catalog
    pub id: MenuItemId,

    /// Item name
    pub name: String,

    /// Item category
    pub category: Category,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Whether the item can currently be ordered
    pub available: bool,
}

impl MenuItem {
    /// Create a new, available menu item.
    #[must_use]
    pub fn new(
        id: impl Into<MenuItemId>,
        name: impl Into<String>,
        category: Category,
        price: Money<'static, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            price,
            available: true,
        }
    }

    /// Returns the same item with its availability flag set.
    #[must_use]
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }
}

/// Menu catalog.
///
/// Holds every menu item, available or not, in the order they were saved. Item ids are
/// unique at every point a change is committed; a rejected change leaves the catalog
/// exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    currency: &'static Currency,
}

impl MenuCatalog {
    /// Create an empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a catalog with the given items.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] under the same rules as [`MenuCatalog::replace_all`].
    pub fn with_items(
        items: impl Into<Vec<MenuItem>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        catalog.replace_all(items)?;

        Ok(catalog)
    }

    /// Items that can currently be ordered, in catalog order.
    pub fn list_available(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(|item| item.available)
    }

    /// Replace the whole catalog.
    ///
    /// The duplicate id check runs first and does not say which id was repeated.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateId`]: two items share an id.
    /// - [`CatalogError::CurrencyMismatch`]: an item is priced in another currency.
    /// - [`CatalogError::NegativePrice`]: an item is priced below zero.
    pub fn replace_all(&mut self, items: impl Into<Vec<MenuItem>>) -> Result<(), CatalogError> {
        let items = items.into();

        validate(&items, self.currency)?;

        info!(items = items.len(), "menu catalog replaced");

        self.items = items;

        Ok(())
    }

    /// Add a single item to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is already taken, or a price error
    /// as for [`MenuCatalog::replace_all`].
    pub fn insert(&mut self, item: MenuItem) -> Result<(), CatalogError> {
        if self.get(item.id).is_some() {
            return Err(CatalogError::DuplicateId);
        }

        check_price(&item, self.currency)?;

        debug!(item_id = %item.id, name = %item.name, "menu item added");

        self.items.push(item);

        Ok(())
    }

    /// Overwrite the item that has the same id, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ItemNotFound`] if no item has this id, or a price error as
    /// for [`MenuCatalog::replace_all`].
    pub fn update(&mut self, item: MenuItem) -> Result<(), CatalogError> {
        check_price(&item, self.currency)?;

        let slot = self
            .items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or(CatalogError::ItemNotFound(item.id))?;

        debug!(item_id = %item.id, name = %item.name, "menu item updated");

        *slot = item;

        Ok(())
    }

    /// Remove an item from the catalog, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ItemNotFound`] if no item has this id.
    pub fn remove(&mut self, id: MenuItemId) -> Result<MenuItem, CatalogError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CatalogError::ItemNotFound(id))?;

        debug!(item_id = %id, "menu item removed");

        Ok(self.items.remove(position))
    }

    /// Switch an item on or off.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ItemNotFound`] if no item has this id.
    pub fn set_available(&mut self, id: MenuItemId, available: bool) -> Result<(), CatalogError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CatalogError::ItemNotFound(id))?;

        item.available = available;

        Ok(())
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up an item that can be ordered right now.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ItemNotFound`]: no item has this id.
    /// - [`CatalogError::ItemUnavailable`]: the item is switched off.
    pub fn orderable(&self, id: MenuItemId) -> Result<&MenuItem, CatalogError> {
        let item = self.get(id).ok_or(CatalogError::ItemNotFound(id))?;

        if item.available {
            Ok(item)
        } else {
            Err(CatalogError::ItemUnavailable(id))
        }
    }

    /// Iterate over every item, available or not.
    pub fn iter(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter()
    }

    /// Number of items in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency every item is priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

fn validate(items: &[MenuItem], currency: &'static Currency) -> Result<(), CatalogError> {
    let mut seen = FxHashSet::default();

    if !items.iter().all(|item| seen.insert(item.id)) {
        return Err(CatalogError::DuplicateId);
    }

    items.iter().try_for_each(|item| check_price(item, currency))
}

fn check_price(item: &MenuItem, currency: &'static Currency) -> Result<(), CatalogError> {
    let item_currency = item.price.currency();

    if item_currency != currency {
        return Err(CatalogError::CurrencyMismatch(
            item.id,
            item_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if item.price.to_minor_units() < 0 {
        return Err(CatalogError::NegativePrice(item.id));
    }

    Ok(())
}
