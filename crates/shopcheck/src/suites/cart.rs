//! Cart flow: item detail, checkout rows and removal.

use crate::assertion::expect;
use crate::browser::{Browser, Page};
use crate::fixture::TestContext;
use crate::harness::{TestCase, TestSuite};
use crate::pages::{CheckoutPage, HomePage, ItemPage};
use crate::result::ShopcheckResult;

use super::fixtures::{storefront, CHECKOUT_PAGE, HOME_PAGE, ITEM_PAGE, LOGIN, PAGE};

const BACKPACK: &str = "Sauce Labs Backpack";

const USES: &[&str] = &[LOGIN, HOME_PAGE, ITEM_PAGE, CHECKOUT_PAGE];

async fn add_backpack(ctx: &TestContext) -> ShopcheckResult<()> {
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    let item = ctx.get::<ItemPage>(ITEM_PAGE)?;
    home.click_on_specific_item(BACKPACK).await?;
    expect(&item.item_title).to_have_text(BACKPACK).await?;
    item.click_add_to_cart().await?;
    item.click_checkout().await
}

async fn shows_item_at_checkout(ctx: TestContext) -> ShopcheckResult<()> {
    add_backpack(&ctx).await?;
    let checkout = ctx.get::<CheckoutPage>(CHECKOUT_PAGE)?;
    let row = checkout.get_specific_item(BACKPACK);
    expect(&row).to_contain_text(BACKPACK).await?;
    expect(&row).to_contain_text("29.99").await
}

async fn removes_item(ctx: TestContext) -> ShopcheckResult<()> {
    add_backpack(&ctx).await?;
    let checkout = ctx.get::<CheckoutPage>(CHECKOUT_PAGE)?;
    expect(&checkout.get_specific_item(BACKPACK)).to_be_attached(true).await?;
    checkout.remove_item_from_cart(BACKPACK).await?;
    expect(&checkout.get_specific_item(BACKPACK)).to_be_attached(false).await?;
    expect(&checkout.cart_items).to_have_count(0).await
}

async fn back_to_products(ctx: TestContext) -> ShopcheckResult<()> {
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    let item = ctx.get::<ItemPage>(ITEM_PAGE)?;
    home.click_on_specific_item(BACKPACK).await?;
    expect(&item.item_price).to_have_text("$29.99").await?;
    item.click_back_to_products().await?;
    expect(&home.all_items).to_have_count(6).await
}

async fn reset_app_state(ctx: TestContext) -> ShopcheckResult<()> {
    let page = ctx.get::<Page>(PAGE)?;
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    let item = ctx.get::<ItemPage>(ITEM_PAGE)?;
    let badge = page.get_by_test_id("shopping-cart-badge");

    home.click_on_specific_item(BACKPACK).await?;
    item.click_add_to_cart().await?;
    expect(&badge).to_have_text("1").await?;
    home.open_menu().await?;
    home.click_on_specific_link("Reset App State").await?;
    expect(&badge).to_have_count(0).await
}

/// Cart suite over the merged storefront fixtures
#[must_use]
pub fn cart_suite(browser: &Browser) -> TestSuite {
    let mut suite = TestSuite::new("cart", storefront(browser));
    suite.add_tests([
        TestCase::new("checkout shows the added item and its price", USES, shows_item_at_checkout),
        TestCase::new("removed item leaves the checkout", USES, removes_item),
        TestCase::new("back to products from item detail", &[LOGIN, HOME_PAGE, ITEM_PAGE], back_to_products),
        TestCase::new(
            "reset app state empties the cart",
            &[PAGE, LOGIN, HOME_PAGE, ITEM_PAGE],
            reset_app_state,
        ),
    ]);
    suite
}
