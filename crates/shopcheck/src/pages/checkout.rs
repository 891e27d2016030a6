use std::ops::Deref;

use crate::browser::Page;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;
use crate::pages::BasePage;
use crate::result::ShopcheckResult;

/// Cart screen
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    /// Shared header locators
    pub base: BasePage,
    /// Every cart row
    pub cart_items: Locator,
    /// Every Remove button in the cart
    pub remove_from_cart_button: Locator,
}

impl CheckoutPage {
    /// Bind the cart locators to a page
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            base: BasePage::new(page),
            cart_items: page.locator("[data-test=\"inventory-item\"]"),
            remove_from_cart_button: page.get_by_role(AriaRole::Button, "Remove"),
        }
    }

    /// Cart row containing an element with the item title
    #[must_use]
    pub fn get_specific_item(&self, item_title: &str) -> Locator {
        let child = self.base.page.get_by_text(item_title);
        self.cart_items.filter_has(&child)
    }

    /// Press Remove on the row for `item_title`
    pub async fn remove_item_from_cart(&self, item_title: &str) -> ShopcheckResult<()> {
        self.get_specific_item(item_title)
            .get_by_role(AriaRole::Button, "Remove")
            .click()
            .await
    }
}

impl Deref for CheckoutPage {
    type Target = BasePage;

    fn deref(&self) -> &BasePage {
        &self.base
    }
}

impl PageObject for CheckoutPage {
    fn url_pattern(&self) -> &str {
        "/cart.html"
    }

    fn page(&self) -> &Page {
        &self.base.page
    }

    fn page_name(&self) -> &str {
        "checkout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::Browser;

    #[tokio::test]
    async fn test_specific_item_locator_is_scoped_to_rows() {
        let page = Browser::simulated("https://www.saucedemo.com")
            .new_page()
            .await
            .unwrap();
        let checkout = CheckoutPage::new(&page);
        assert_eq!(
            checkout.get_specific_item("Sauce Labs Backpack").to_string(),
            "css=[data-test=\"inventory-item\"] >> has(text=\"Sauce Labs Backpack\"i)"
        );
    }
}
