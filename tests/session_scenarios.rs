//! End-to-end checkout scenarios driven through a [`Session`].
//!
//! Prices are INR; the standard policy gives 10% off above ₹500.00, otherwise 5% off for
//! three or more cart lines, and estimates 10 minutes plus 2 per unit.

use std::num::NonZeroU32;

use jiff::{Timestamp, civil::time};
use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use canteen::prelude::*;

fn qty(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

fn inr(major: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(major * 100, INR)
}

fn flat_menu() -> TestResult<MenuCatalog> {
    Ok(MenuCatalog::with_items(
        vec![
            MenuItem::new(MenuItemId(1), "Thali", Category::Meal, inr(100)),
            MenuItem::new(MenuItemId(2), "Biryani", Category::Meal, inr(100)),
            MenuItem::new(MenuItemId(3), "Dosa", Category::Snack, inr(100)),
            MenuItem::new(MenuItemId(4), "Platter", Category::Meal, inr(300)),
        ],
        INR,
    )?)
}

fn lunch() -> Checkout {
    Checkout::pickup_at(time(12, 30, 0, 0))
}

#[test]
fn two_coffees_have_no_discount() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);

    session.add_to_cart(MenuItemId(1), qty(2))?;

    let summary = session.summary()?;

    assert_eq!(summary.subtotal, inr(100));
    assert_eq!(summary.discount, inr(0));
    assert_eq!(summary.tier, DiscountTier::None);
    assert_eq!(summary.total, inr(100));
    assert_eq!(summary.estimated_prep_minutes, 14);

    Ok(())
}

#[test]
fn three_lines_get_the_multi_line_discount() -> TestResult {
    let mut session = Session::new(flat_menu()?);

    for id in 1..=3 {
        session.add_to_cart(MenuItemId(id), qty(1))?;
    }

    let summary = session.summary()?;

    assert_eq!(summary.subtotal, inr(300));
    assert_eq!(summary.tier, DiscountTier::MultiLine);
    assert_eq!(summary.discount, inr(15));
    assert_eq!(summary.total, inr(285));

    Ok(())
}

#[test]
fn large_order_discount_takes_precedence() -> TestResult {
    let mut session = Session::new(flat_menu()?);

    session.add_to_cart(MenuItemId(4), qty(1))?;
    session.add_to_cart(MenuItemId(1), qty(3))?;

    let summary = session.summary()?;

    assert_eq!(summary.subtotal, inr(600));
    assert_eq!(summary.tier, DiscountTier::LargeOrder);
    assert_eq!(summary.discount, inr(60));
    assert_eq!(summary.total, inr(540));

    session.add_to_cart(MenuItemId(2), qty(1))?;

    let summary = session.summary()?;

    assert_eq!(summary.tier, DiscountTier::LargeOrder);
    assert_eq!(summary.discount, inr(70));

    Ok(())
}

#[test]
fn status_update_for_unknown_order_changes_nothing() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);

    session.add_to_cart(MenuItemId(2), qty(1))?;
    session.checkout_at(lunch(), Timestamp::UNIX_EPOCH)?;

    let before = session.orders().clone();
    let result = session.update_order_status(OrderId(7), OrderStatus::Ready);

    assert_eq!(
        result,
        Err(SessionError::Order(OrderError::OrderNotFound(OrderId(7))))
    );
    assert_eq!(
        session.orders().list().map(Order::status).collect::<Vec<_>>(),
        before.list().map(Order::status).collect::<Vec<_>>()
    );
    assert_eq!(session.orders().next_id(), OrderId(2));

    Ok(())
}

#[test]
fn checkout_assigns_sequential_ids_and_clears_cart() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);

    for expected in 1..=3 {
        session.add_to_cart(MenuItemId(1), qty(1))?;

        let order = session.checkout_at(lunch(), Timestamp::UNIX_EPOCH)?;

        assert_eq!(order.id(), OrderId(expected));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(session.cart().is_empty());
    }

    let empty = session.checkout_at(lunch(), Timestamp::UNIX_EPOCH);

    assert!(matches!(
        empty,
        Err(SessionError::Order(OrderError::EmptyCart))
    ));
    assert_eq!(session.orders().len(), 3);
    assert_eq!(session.orders().next_id(), OrderId(4));

    Ok(())
}

#[test]
fn orders_are_frozen_after_checkout() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);

    session.add_to_cart(MenuItemId(1), qty(2))?;
    session.checkout_at(
        lunch().with_instructions("extra hot"),
        Timestamp::UNIX_EPOCH,
    )?;

    let mut items = session.catalog().iter().cloned().collect::<Vec<_>>();

    for item in &mut items {
        item.price = inr(999);
    }

    session.save_menu(items)?;
    session.update_order_status(OrderId(1), OrderStatus::Completed)?;
    session.update_order_status(OrderId(1), OrderStatus::Pending)?;

    let order = session.orders().get(OrderId(1)).ok_or("order missing")?;

    assert_eq!(*order.total_amount(), inr(100));
    assert_eq!(order.items_summary(), "Coffee (x2)");
    assert_eq!(order.instructions(), Some("extra hot"));
    assert_eq!(order.pickup_time(), time(12, 30, 0, 0));
    assert_eq!(order.status(), OrderStatus::Pending);

    Ok(())
}

#[test]
fn cart_lines_are_snapshots_of_the_menu() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);

    let key = session.add_to_cart(MenuItemId(2), qty(1))?;

    session.update_menu_item(
        MenuItem::new(MenuItemId(2), "Masala Tea", Category::Beverage, inr(45))
            .with_available(false),
    )?;

    let line = session.cart().get(key).ok_or("line missing")?;

    assert_eq!(line.name(), "Tea");
    assert_eq!(*line.unit_price(), inr(40));
    assert!(matches!(
        session.add_to_cart(MenuItemId(2), qty(1)),
        Err(SessionError::Catalog(CatalogError::ItemUnavailable(MenuItemId(2))))
    ));

    Ok(())
}

#[test]
fn line_keys_survive_removal_of_earlier_lines() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);

    let coffee = session.add_to_cart(MenuItemId(1), qty(1))?;
    let tea = session.add_to_cart(MenuItemId(2), qty(1))?;
    let second_coffee = session.add_to_cart(MenuItemId(1), qty(1))?;

    assert_eq!(session.cart().len(), 3);

    session.remove_from_cart(coffee)?;

    let updated = session.update_cart_quantity(second_coffee, qty(4))?;

    assert_eq!(*updated.subtotal(), inr(200));
    assert_eq!(session.cart().get(tea).map(CartLine::name), Some("Tea"));
    assert!(matches!(
        session.remove_from_cart(coffee),
        Err(SessionError::Cart(CartError::LineNotFound(_)))
    ));
    assert!(matches!(
        session.remove_from_cart_at(2),
        Err(SessionError::Cart(CartError::InvalidIndex(2)))
    ));

    Ok(())
}

#[test]
fn duplicate_menu_save_leaves_catalog_untouched() -> TestResult {
    let mut session = Session::new(cafeteria_menu()?);
    let before = session.catalog().clone();

    let result = session.save_menu(vec![
        MenuItem::new(MenuItemId(1), "Coffee", Category::Beverage, inr(55)),
        MenuItem::new(MenuItemId(1), "Filter Coffee", Category::Beverage, inr(60)),
    ]);

    assert_eq!(
        result,
        Err(SessionError::Catalog(CatalogError::DuplicateId))
    );
    assert_eq!(session.catalog(), &before);

    Ok(())
}
