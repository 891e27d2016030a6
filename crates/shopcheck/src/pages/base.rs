use crate::browser::Page;
use crate::locator::Locator;
use crate::result::ShopcheckResult;

/// Elements shared by every screen behind the login
#[derive(Debug, Clone)]
pub struct BasePage {
    /// Page handle
    pub page: Page,
    /// Header bar with the menu button and the cart link
    pub navigation_bar: Locator,
    /// Cart link in the header
    pub checkout_cart: Locator,
}

impl BasePage {
    /// Bind the shared locators to a page
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            navigation_bar: page.locator("[data-test=\"primary-header\"]"),
            checkout_cart: page.locator("[data-test=\"shopping-cart-link\"]"),
        }
    }

    /// Open the cart
    pub async fn click_checkout(&self) -> ShopcheckResult<()> {
        self.checkout_cart.click().await
    }
}
