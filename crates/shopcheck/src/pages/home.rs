use std::ops::Deref;

use crate::browser::Page;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;
use crate::pages::BasePage;
use crate::result::ShopcheckResult;

/// Inventory screen shown after login
#[derive(Debug, Clone)]
pub struct HomePage {
    /// Shared header locators
    pub base: BasePage,
    /// Hamburger menu button
    pub menu: Locator,
    /// Logout entry of the side menu (visible once the menu is open)
    pub logout_button: Locator,
    /// Every visible link
    pub links: Locator,
    /// Inventory cards
    pub all_items: Locator,
}

impl HomePage {
    /// Bind the inventory locators to a page
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            base: BasePage::new(page),
            menu: page.get_by_role(AriaRole::Button, "Open Menu"),
            logout_button: page.get_by_role(AriaRole::Link, "Logout"),
            links: page.get_by_any_role(AriaRole::Link),
            all_items: page.locator(".inventory_item"),
        }
    }

    /// Open the side menu
    pub async fn open_menu(&self) -> ShopcheckResult<()> {
        self.menu.click().await
    }

    /// Log out from the side menu
    pub async fn click_logout(&self) -> ShopcheckResult<()> {
        self.logout_button.click().await
    }

    /// Follow the link whose text matches `name`
    pub async fn click_on_specific_link(&self, name: &str) -> ShopcheckResult<()> {
        self.links.get_by_text(name).click().await
    }

    /// Open an item from its inventory card
    pub async fn click_on_specific_item(&self, name: &str) -> ShopcheckResult<()> {
        self.all_items
            .filter_has_text(name)
            .get_by_text(name)
            .click()
            .await
    }
}

impl Deref for HomePage {
    type Target = BasePage;

    fn deref(&self) -> &BasePage {
        &self.base
    }
}

impl PageObject for HomePage {
    fn url_pattern(&self) -> &str {
        "/inventory.html"
    }

    fn page(&self) -> &Page {
        &self.base.page
    }

    fn page_name(&self) -> &str {
        "home"
    }
}
