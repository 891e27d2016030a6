//! The storefront test suites.
//!
//! Fixtures come from two independent sets merged into one declarator
//! ([`fixtures::storefront`]); the login suite drives the login form through
//! the valid and invalid credential tables, the cart suite the item, cart and
//! menu screens.

pub mod cart;
pub mod data;
pub mod fixtures;
pub mod login;

pub use cart::cart_suite;
pub use data::{Credentials, InvalidLogin, INVALID_LOGINS, PASSWORD, VALID_USERS};
pub use fixtures::{home_fixtures, login_fixtures, storefront};
pub use login::login_suite;

use crate::browser::Browser;
use crate::harness::TestSuite;

/// Every suite, in run order
#[must_use]
pub fn all_suites(browser: &Browser) -> Vec<TestSuite> {
    vec![login_suite(browser), cart_suite(browser)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_suites() {
        let suites = all_suites(&Browser::simulated("https://www.saucedemo.com"));
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["login", "cart"]);
    }
}
