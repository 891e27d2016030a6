use std::ops::Deref;

use crate::browser::Page;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;
use crate::pages::BasePage;
use crate::result::ShopcheckResult;

/// Item detail screen
#[derive(Debug, Clone)]
pub struct ItemPage {
    /// Shared header locators
    pub base: BasePage,
    /// Add-to-cart button
    pub add_to_cart_button: Locator,
    /// Item name
    pub item_title: Locator,
    /// Item price, e.g. `$29.99`
    pub item_price: Locator,
    /// Back-to-inventory button
    pub back_to_products_button: Locator,
}

impl ItemPage {
    /// Bind the detail locators to a page
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            base: BasePage::new(page),
            add_to_cart_button: page.get_by_role(AriaRole::Button, "ADD TO CART"),
            item_title: page.locator(".inventory_details_name"),
            item_price: page.locator(".inventory_details_price"),
            back_to_products_button: page.get_by_role(AriaRole::Button, "Back to products"),
        }
    }

    /// Put the item in the cart
    pub async fn click_add_to_cart(&self) -> ShopcheckResult<()> {
        self.add_to_cart_button.click().await
    }

    /// Return to the inventory
    pub async fn click_back_to_products(&self) -> ShopcheckResult<()> {
        self.back_to_products_button.click().await
    }
}

impl Deref for ItemPage {
    type Target = BasePage;

    fn deref(&self) -> &BasePage {
        &self.base
    }
}

impl PageObject for ItemPage {
    fn url_pattern(&self) -> &str {
        "/inventory-item.html"
    }

    fn page(&self) -> &Page {
        &self.base.page
    }

    fn page_name(&self) -> &str {
        "item"
    }
}
