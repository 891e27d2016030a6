use crate::browser::Page;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;
use crate::result::ShopcheckResult;

/// The login form at the storefront root
#[derive(Debug, Clone)]
pub struct LoginPage {
    /// Page handle
    pub page: Page,
    /// Username textbox
    pub username_input: Locator,
    /// Password textbox
    pub password_input: Locator,
    /// Submit button
    pub login_button: Locator,
    /// Error banner shown after a rejected submit
    pub login_error: Locator,
}

impl LoginPage {
    /// Bind the login locators to a page
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            username_input: page.get_by_role(AriaRole::Textbox, "Username"),
            password_input: page.get_by_role(AriaRole::Textbox, "Password"),
            login_button: page.get_by_role(AriaRole::Button, "LOGIN"),
            login_error: page.locator("[data-test=\"error\"]"),
        }
    }

    /// Open the login form
    pub async fn go_to(&self) -> ShopcheckResult<()> {
        self.page.goto("/").await
    }

    /// Type into the username box
    pub async fn enter_username(&self, username: &str) -> ShopcheckResult<()> {
        self.username_input.fill(username).await
    }

    /// Type into the password box
    pub async fn enter_password(&self, password: &str) -> ShopcheckResult<()> {
        self.password_input.fill(password).await
    }

    /// Submit the form
    pub async fn click_login(&self) -> ShopcheckResult<()> {
        self.login_button.click().await
    }
}

impl PageObject for LoginPage {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn page(&self) -> &Page {
        &self.page
    }

    fn page_name(&self) -> &str {
        "login"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::expect;
    use crate::browser::Browser;

    async fn login_page() -> LoginPage {
        let page = Browser::simulated("https://www.saucedemo.com")
            .new_page()
            .await
            .unwrap();
        let login = LoginPage::new(&page);
        login.go_to().await.unwrap();
        login
    }

    #[tokio::test]
    async fn test_go_to_shows_the_form() {
        let login = login_page().await;
        assert!(login.is_current().await.unwrap());
        expect(&login.login_button).to_be_visible().await.unwrap();
        expect(&login.login_error).to_be_attached(false).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_submit_stays_on_form() {
        let login = login_page().await;
        login.enter_username("standard_user").await.unwrap();
        login.enter_password("wrong_password").await.unwrap();
        login.click_login().await.unwrap();
        expect(&login.login_error)
            .to_contain_text("Username and password do not match any user in this service")
            .await
            .unwrap();
        assert!(login.is_current().await.unwrap());
    }

    #[tokio::test]
    async fn test_locators_are_built_before_navigation() {
        let page = Browser::simulated("https://www.saucedemo.com")
            .new_page()
            .await
            .unwrap();
        let login = LoginPage::new(&page);
        assert_eq!(login.login_button.count().await.unwrap(), 0);
        login.go_to().await.unwrap();
        assert_eq!(login.login_button.count().await.unwrap(), 1);
    }
}
