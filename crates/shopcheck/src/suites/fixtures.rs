//! Storefront fixtures.
//!
//! Two independent sets, one for the login flow and one for the shop
//! screens, each bringing its own `page` fixture. [`storefront`] merges them;
//! the shared `page` is set up once per test.

use std::sync::Arc;

use crate::browser::{Browser, Page};
use crate::fixture::{FixtureSet, TestContext};
use crate::pages::{CheckoutPage, HomePage, ItemPage, LoginPage};

use super::data::Credentials;

pub const PAGE: &str = "page";
pub const USER: &str = "user";
pub const LOGIN_PAGE: &str = "login_page";
pub const LOGIN: &str = "login";
pub const HOME_PAGE: &str = "home_page";
pub const ITEM_PAGE: &str = "item_page";
pub const CHECKOUT_PAGE: &str = "checkout_page";

/// A fresh page per test, closed at teardown
fn with_page(set: FixtureSet, browser: &Browser) -> FixtureSet {
    let browser = browser.clone();
    set.fixture_with_teardown(
        PAGE,
        &[],
        move |_ctx| {
            let browser = browser.clone();
            async move { browser.new_page().await }
        },
        |page: Arc<Page>| async move { page.close().await },
    )
}

/// `login_page` opens the form; `login` submits it with the `user` option
#[must_use]
pub fn login_fixtures(browser: &Browser) -> FixtureSet {
    with_page(FixtureSet::new("login"), browser)
        .option(USER, Credentials::default())
        .fixture(LOGIN_PAGE, &[PAGE], |ctx: TestContext| async move {
            let page = ctx.get::<Page>(PAGE)?;
            let login = LoginPage::new(&page);
            login.go_to().await?;
            Ok(login)
        })
        .fixture(LOGIN, &[LOGIN_PAGE, USER], |ctx: TestContext| async move {
            let login = ctx.get::<LoginPage>(LOGIN_PAGE)?;
            let user = ctx.get::<Credentials>(USER)?;
            login.enter_username(&user.username).await?;
            login.enter_password(&user.password).await?;
            login.click_login().await?;
            Ok(Credentials::clone(&user))
        })
}

/// Page objects for the screens behind the login
#[must_use]
pub fn home_fixtures(browser: &Browser) -> FixtureSet {
    with_page(FixtureSet::new("home"), browser)
        .fixture(HOME_PAGE, &[PAGE], |ctx: TestContext| async move {
            Ok(HomePage::new(&*ctx.get::<Page>(PAGE)?))
        })
        .fixture(ITEM_PAGE, &[PAGE], |ctx: TestContext| async move {
            Ok(ItemPage::new(&*ctx.get::<Page>(PAGE)?))
        })
        .fixture(CHECKOUT_PAGE, &[PAGE], |ctx: TestContext| async move {
            Ok(CheckoutPage::new(&*ctx.get::<Page>(PAGE)?))
        })
}

/// Every storefront fixture
#[must_use]
pub fn storefront(browser: &Browser) -> FixtureSet {
    FixtureSet::merge("storefront", [&login_fixtures(browser), &home_fixtures(browser)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureScope;
    use crate::page_object::PageObject;
    use std::collections::HashMap;

    mod composition_tests {
        use super::*;

        #[test]
        fn test_sets_are_independent() {
            let browser = Browser::simulated("https://www.saucedemo.com");
            let login = login_fixtures(&browser);
            let home = home_fixtures(&browser);
            assert!(login.validate().is_ok());
            assert!(home.validate().is_ok());
            assert!(!login.contains(HOME_PAGE));
            assert!(!home.contains(LOGIN));
        }

        #[test]
        fn test_merge_is_union_by_name() {
            let browser = Browser::simulated("https://www.saucedemo.com");
            let merged = storefront(&browser);
            assert!(merged.validate().is_ok());
            let mut names = merged.names();
            names.sort_unstable();
            assert_eq!(
                names,
                vec![CHECKOUT_PAGE, HOME_PAGE, ITEM_PAGE, LOGIN, LOGIN_PAGE, PAGE, USER]
            );
            assert!(merged.is_option(USER));
        }

        #[tokio::test]
        async fn test_shared_page_set_up_once() {
            let browser = Browser::simulated("https://www.saucedemo.com");
            let mut scope = FixtureScope::new(Arc::new(storefront(&browser)), HashMap::new());
            let ctx = scope.resolve(&[LOGIN, HOME_PAGE]).await.unwrap();
            assert_eq!(scope.completed().iter().filter(|n| *n == PAGE).count(), 1);

            let home = ctx.get::<HomePage>(HOME_PAGE).unwrap();
            assert!(home.is_current().await.unwrap());
            assert_eq!(*ctx.get::<Credentials>(LOGIN).unwrap(), Credentials::default());
            scope.teardown().await.unwrap();
        }
    }
}
