//! Login flow: the inline baseline, the data-driven tables and the
//! login/logout state transitions.

use crate::assertion::expect;
use crate::browser::{Browser, Page};
use crate::fixture::TestContext;
use crate::harness::{TestCase, TestSuite};
use crate::locator::AriaRole;
use crate::page_object::PageObject;
use crate::pages::{HomePage, LoginPage};
use crate::result::{ShopcheckError, ShopcheckResult};
use crate::table::parameterize;

use super::data::{Credentials, InvalidLogin, INVALID_LOGINS, PASSWORD, VALID_USERS};
use super::fixtures::{storefront, HOME_PAGE, LOGIN, LOGIN_PAGE, PAGE, USER};

/// Raw locators, no page objects
async fn login_inline(ctx: TestContext) -> ShopcheckResult<()> {
    let page = ctx.get::<Page>(PAGE)?;
    page.goto("/").await?;
    page.get_by_role(AriaRole::Textbox, "Username")
        .fill("standard_user")
        .await?;
    page.get_by_role(AriaRole::Textbox, "Password")
        .fill(PASSWORD)
        .await?;
    page.get_by_role(AriaRole::Button, "LOGIN").click().await?;
    page.get_by_role(AriaRole::Button, "Open Menu").click().await?;
    expect(&page.get_by_role(AriaRole::Link, "Logout")).to_be_visible().await
}

async fn can_log_in(username: &'static str, ctx: TestContext) -> ShopcheckResult<()> {
    let login = ctx.get::<LoginPage>(LOGIN_PAGE)?;
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    login.enter_username(username).await?;
    login.enter_password(PASSWORD).await?;
    login.click_login().await?;
    home.open_menu().await?;
    expect(&home.logout_button).to_be_visible().await
}

async fn rejected_login(row: InvalidLogin, ctx: TestContext) -> ShopcheckResult<()> {
    let login = ctx.get::<LoginPage>(LOGIN_PAGE)?;
    login.enter_username(row.username).await?;
    login.enter_password(row.password).await?;
    login.click_login().await?;
    expect(&login.login_error).to_contain_text(row.error).await?;
    expect(&login.login_button).to_be_visible().await
}

async fn logged_in_by_fixture(ctx: TestContext) -> ShopcheckResult<()> {
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    home.open_menu().await?;
    expect(&home.logout_button).to_be_visible().await
}

async fn logout(ctx: TestContext) -> ShopcheckResult<()> {
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    let login = ctx.get::<LoginPage>(LOGIN_PAGE)?;
    home.open_menu().await?;
    home.click_logout().await?;
    expect(&login.login_button).to_be_visible().await?;
    expect(&login.login_error).to_have_count(0).await?;
    if login.is_current().await? {
        Ok(())
    } else {
        Err(ShopcheckError::page(format!(
            "expected the login form after logout, at {}",
            login.page.url().await?
        )))
    }
}

async fn recovers_after_error(ctx: TestContext) -> ShopcheckResult<()> {
    let login = ctx.get::<LoginPage>(LOGIN_PAGE)?;
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    login.click_login().await?;
    expect(&login.login_error).to_contain_text("Username is required").await?;

    let user = Credentials::default();
    login.enter_username(&user.username).await?;
    login.enter_password(&user.password).await?;
    login.click_login().await?;
    expect(&home.all_items).to_have_count(6).await
}

async fn overridden_user(ctx: TestContext) -> ShopcheckResult<()> {
    let used = ctx.get::<Credentials>(LOGIN)?;
    if used.username != "problem_user" {
        return Err(ShopcheckError::fixture(format!(
            "login used '{}' instead of the overridden user",
            used.username
        )));
    }
    let home = ctx.get::<HomePage>(HOME_PAGE)?;
    expect(&home.navigation_bar).to_be_visible().await
}

/// Login suite over the merged storefront fixtures
#[must_use]
pub fn login_suite(browser: &Browser) -> TestSuite {
    let mut suite = TestSuite::new("login", storefront(browser));

    suite.add_test(TestCase::new("login_inline", &[PAGE], login_inline));
    suite.add_tests(parameterize(
        VALID_USERS.iter().copied(),
        &[LOGIN_PAGE, HOME_PAGE],
        |u| format!("can log in {u}"),
        can_log_in,
    ));
    suite.add_tests(parameterize(
        INVALID_LOGINS.iter().copied(),
        &[LOGIN_PAGE],
        |row| {
            format!(
                "unable to log in with username '{}' and error {}",
                row.username, row.error
            )
        },
        rejected_login,
    ));
    suite.add_test(TestCase::new(
        "Test the logging in fixture",
        &[LOGIN, HOME_PAGE],
        logged_in_by_fixture,
    ));
    suite.add_test(TestCase::new(
        "logout returns to the login form",
        &[LOGIN, HOME_PAGE, LOGIN_PAGE],
        logout,
    ));
    suite.add_test(TestCase::new(
        "valid login after an error",
        &[LOGIN_PAGE, HOME_PAGE],
        recovers_after_error,
    ));
    suite.add_test(
        TestCase::new("login fixture uses the user option", &[LOGIN, HOME_PAGE], overridden_user)
            .with_option(USER, Credentials::new("problem_user", PASSWORD)),
    );
    suite
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_shape() {
        let suite = login_suite(&Browser::simulated("https://www.saucedemo.com"));
        assert!(suite.validate().is_ok());
        assert_eq!(suite.test_count(), 1 + VALID_USERS.len() + INVALID_LOGINS.len() + 4);
        let names = suite.test_names();
        assert!(names.contains(&"can log in performance_glitch_user"));
        assert!(names.contains(
            &"unable to log in with username 'locked_out_user' and error Password is required"
        ));
    }
}
