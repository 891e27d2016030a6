//! Storefront page objects.
//!
//! [`BasePage`] holds what every authenticated screen shares (the header and
//! the cart link). [`HomePage`], [`ItemPage`] and [`CheckoutPage`] embed it
//! and deref to it, so `item_page.click_checkout()` works without a trait.
//! [`LoginPage`] stands alone: the login screen has no header.

mod base;
mod checkout;
mod home;
mod item;
mod login;

pub use base::BasePage;
pub use checkout::CheckoutPage;
pub use home::HomePage;
pub use item::ItemPage;
pub use login::LoginPage;
