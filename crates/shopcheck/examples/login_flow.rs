//! Login Flow Example
//!
//! Drives the simulated storefront through the page objects by hand, then
//! runs the bundled login suite.
//!
//! # Running
//!
//! ```bash
//! cargo run --example login_flow -p shopcheck
//! ```

#![allow(clippy::uninlined_format_args)]

use shopcheck::pages::{HomePage, LoginPage};
use shopcheck::suites::data::Credentials;
use shopcheck::suites::login::login_suite;
use shopcheck::{expect, Browser, ShopcheckResult, TestHarness, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> ShopcheckResult<()> {
    println!("=== Shopcheck Login Flow ===\n");

    let browser = Browser::simulated(DEFAULT_BASE_URL);
    let page = browser.new_page().await?;

    // 1. Log in through the page object
    let credentials = Credentials::default();
    let login = LoginPage::new(&page);
    login.go_to().await?;
    login.enter_username(&credentials.username).await?;
    login.enter_password(&credentials.password).await?;
    login.click_login().await?;
    expect(&page.locator(".title")).to_have_text("Products").await?;
    println!("logged in as {} at {}", credentials.username, page.url().await?);

    // 2. Log out again
    let home = HomePage::new(&page);
    home.open_menu().await?;
    home.click_logout().await?;
    expect(&login.login_button).to_be_visible().await?;
    println!("logged out, back at {}", page.url().await?);
    page.close().await?;

    // 3. The same steps as a fixture-driven suite
    let results = TestHarness::new().run(&login_suite(&browser)).await?;
    for result in &results.results {
        println!("  [{}] {}", result.status, result.name);
    }
    println!(
        "\n{} passed, {} failed",
        results.passed_count(),
        results.failed_count()
    );

    browser.close().await?;
    Ok(())
}
