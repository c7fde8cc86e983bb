//! Menu Fixtures

use std::path::Path;

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    fixtures::{CAFETERIA_MENU_YAML, FixtureError, parse_currency, parse_price, read},
    menu::{Category, MenuCatalog, MenuItem, MenuItemId},
};

/// Wrapper for menu in YAML
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// Currency code every price must use
    pub currency: String,

    /// Menu items, in display order
    pub items: Vec<MenuItemFixture>,
}

/// Menu item fixture from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemFixture {
    /// Item id
    pub id: MenuItemId,

    /// Item name
    pub name: String,

    /// Item category
    pub category: Category,

    /// Price in format "50.00 INR"
    pub price: String,

    /// Whether the item can be ordered; defaults to true
    #[serde(default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}

impl MenuItemFixture {
    /// Convert into a menu item priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed or uses another currency.
    pub fn into_item(self, currency: &'static Currency) -> Result<MenuItem, FixtureError> {
        let (minor_units, price_currency) = parse_price(&self.price)?;

        if price_currency != currency {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                price_currency.iso_alpha_code.to_string(),
            ));
        }

        Ok(MenuItem {
            id: self.id,
            name: self.name,
            category: self.category,
            price: Money::from_minor(minor_units, currency),
            available: self.available,
        })
    }
}

impl MenuFixture {
    /// Parse a menu from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the text is not a valid menu document.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Read and parse a menu file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::from_yaml(&read(path.as_ref())?)
    }

    /// Build a catalog, validating ids and prices.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or the catalog rejects the items.
    pub fn into_catalog(self) -> Result<MenuCatalog, FixtureError> {
        let currency = parse_currency(&self.currency)?;
        let items = items_in(self.items, currency)?;

        Ok(MenuCatalog::with_items(items, currency)?)
    }
}

/// Convert item fixtures into menu items priced in `currency`.
///
/// # Errors
///
/// Returns an error for the first item whose price cannot be used.
pub fn items_in(
    fixtures: Vec<MenuItemFixture>,
    currency: &'static Currency,
) -> Result<Vec<MenuItem>, FixtureError> {
    fixtures
        .into_iter()
        .map(|fixture| fixture.into_item(currency))
        .collect()
}

/// The bundled cafeteria menu.
///
/// # Errors
///
/// Only fails if the bundled YAML is broken.
pub fn cafeteria_menu() -> Result<MenuCatalog, FixtureError> {
    MenuFixture::from_yaml(CAFETERIA_MENU_YAML)?.into_catalog()
}

/// Load a menu from `path`, or the bundled menu when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_menu(path: Option<&Path>) -> Result<MenuCatalog, FixtureError> {
    match path {
        Some(path) => MenuFixture::from_path(path)?.into_catalog(),
        None => cafeteria_menu(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rusty_money::iso::INR;
    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use crate::menu::CatalogError;

    use super::*;

    #[test]
    fn cafeteria_menu_loads() -> TestResult {
        let catalog = cafeteria_menu()?;

        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.currency(), INR);
        assert_eq!(catalog.list_available().count(), 7);

        let coffee = catalog.get(MenuItemId(1)).ok_or("coffee missing")?;

        assert_eq!(coffee.name, "Coffee");
        assert_eq!(coffee.category, Category::Beverage);
        assert_eq!(coffee.price, Money::from_minor(5000, INR));

        Ok(())
    }

    #[test]
    fn load_menu_reads_file() -> TestResult {
        let mut file = NamedTempFile::new()?;

        writeln!(
            file,
            "currency: INR\nitems:\n  - id: 10\n    name: Lassi\n    category: Beverage\n    price: \"35.50 INR\"\n"
        )?;

        let catalog = load_menu(Some(file.path()))?;

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(MenuItemId(10)).map(|item| item.price),
            Some(Money::from_minor(3550, INR))
        );

        Ok(())
    }

    #[test]
    fn duplicate_ids_in_file_are_rejected() -> TestResult {
        let yaml = r#"
currency: INR
items:
  - { id: 1, name: Coffee, category: Beverage, price: "50.00 INR" }
  - { id: 1, name: Tea, category: Beverage, price: "40.00 INR" }
"#;

        let result = MenuFixture::from_yaml(yaml)?.into_catalog();

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::DuplicateId))
        ));

        Ok(())
    }

    #[test]
    fn price_in_other_currency_is_rejected() -> TestResult {
        let yaml = r#"
currency: INR
items:
  - { id: 1, name: Coffee, category: Beverage, price: "1.00 USD" }
"#;

        let result = MenuFixture::from_yaml(yaml)?.into_catalog();

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "INR" && found == "USD"
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_menu(Some(Path::new("does/not/exist.yml")));

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
