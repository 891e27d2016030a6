//! End-to-end runs of the storefront suites against the simulated site.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use shopcheck::demo_site::DemoSite;
use shopcheck::suites::{
    all_suites, cart_suite, login_suite, storefront, Credentials, INVALID_LOGINS, VALID_USERS,
};
use shopcheck::{
    expect, Browser, Page, ShopcheckError, TestCase, TestHarness, TestStatus, TestSuite,
    WaitOptions, DEFAULT_BASE_URL,
};

fn site_browser() -> (DemoSite, Browser) {
    let site = DemoSite::new();
    let browser = Browser::new(Arc::new(site.clone()), DEFAULT_BASE_URL);
    (site, browser)
}

fn failures(results: &shopcheck::SuiteResults) -> String {
    results
        .failures()
        .iter()
        .map(|r| format!("{}: {}", r.name, r.error.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn valid_users_reach_the_inventory() {
    let (_site, browser) = site_browser();
    let results = TestHarness::new()
        .with_filter("can log in")
        .run(&login_suite(&browser))
        .await
        .unwrap();
    assert_eq!(results.total(), VALID_USERS.len());
    assert!(results.all_passed(), "{}", failures(&results));
}

#[tokio::test]
async fn invalid_logins_show_their_error_and_stay_put() {
    let (_site, browser) = site_browser();
    let results = TestHarness::new()
        .with_filter("unable to log in")
        .run(&login_suite(&browser))
        .await
        .unwrap();
    assert_eq!(results.total(), INVALID_LOGINS.len());
    assert!(results.all_passed(), "{}", failures(&results));
}

#[tokio::test]
async fn every_suite_passes_and_leaks_no_pages() {
    let (site, browser) = site_browser();
    let harness = TestHarness::new().with_jobs(4);
    let mut tests = 0;
    for suite in all_suites(&browser) {
        let results = harness.run(&suite).await.unwrap();
        assert!(results.all_passed(), "{}", failures(&results));
        tests += results.total();
    }
    assert_eq!(site.open_pages(), 0);
    assert_eq!(site.pages_opened(), tests);
}

#[tokio::test]
async fn cart_row_shows_name_and_price_then_detaches() {
    let (_site, browser) = site_browser();
    let results = TestHarness::new().run(&cart_suite(&browser)).await.unwrap();
    assert!(results.all_passed(), "{}", failures(&results));
    let checkout = results
        .get("checkout shows the added item and its price")
        .unwrap();
    assert_eq!(
        checkout.fixtures.iter().filter(|f| *f == "page").count(),
        1,
        "page shared by login and the page objects is set up once"
    );
}

#[tokio::test]
async fn teardown_runs_once_when_the_body_fails() {
    let (site, browser) = site_browser();
    let quick = browser.clone().with_wait_options(WaitOptions::new().with_timeout(200));
    let mut suite = TestSuite::new("failing", storefront(&quick));
    suite.add_test(TestCase::new(
        "expects the wrong error",
        &["login_page"],
        |ctx| async move {
            let login = ctx.get::<shopcheck::pages::LoginPage>("login_page")?;
            login.click_login().await?;
            expect(&login.login_error)
                .to_contain_text("Password is required")
                .await
        },
    ));
    suite.add_test(TestCase::new("errors in the body", &["page"], |_ctx| async {
        Err(ShopcheckError::page("boom"))
    }));

    let results = TestHarness::new().run(&suite).await.unwrap();
    let wrong = results.get("expects the wrong error").unwrap();
    assert_eq!(wrong.status, TestStatus::Failed);
    let message = wrong.error.as_deref().unwrap();
    assert!(message.contains("Password is required"), "{message}");
    assert!(message.contains("Username is required"), "{message}");
    assert_eq!(results.get("errors in the body").unwrap().status, TestStatus::Failed);

    assert_eq!(site.pages_opened(), 2);
    assert_eq!(site.open_pages(), 0);
}

#[tokio::test]
async fn timeout_still_tears_down() {
    let (site, browser) = site_browser();
    let mut suite = TestSuite::new("slow", storefront(&browser));
    suite.add_test(
        TestCase::new("hangs", &["page"], |_ctx| async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(())
        })
        .with_timeout(100),
    );
    let results = TestHarness::new().run(&suite).await.unwrap();
    let hung = results.get("hangs").unwrap();
    assert_eq!(hung.status, TestStatus::Errored);
    assert!(hung.error.as_deref().unwrap().contains("timed out"));
    assert_eq!(site.open_pages(), 0);
}

#[tokio::test]
async fn failed_fixture_setup_errors_the_test() {
    let (site, browser) = site_browser();
    // unknown account: the login fixture submits, the home page never appears
    let quick = browser.with_wait_options(WaitOptions::new().with_timeout(200));
    let set = storefront(&quick).fixture("inventory_ready", &["login", "home_page"], |ctx| async move {
        let home = ctx.get::<shopcheck::pages::HomePage>("home_page")?;
        expect(&home.all_items).to_have_count(6).await?;
        Ok(())
    });
    let mut suite = TestSuite::new("setup", set);
    suite.add_test(
        TestCase::new("never runs", &["inventory_ready"], |_ctx| async {
            Err(ShopcheckError::page("body ran"))
        })
        .with_option("user", Credentials::new("nobody", "secret_sauce")),
    );
    let results = TestHarness::new().run(&suite).await.unwrap();
    let result = results.get("never runs").unwrap();
    assert_eq!(result.status, TestStatus::Errored);
    let message = result.error.as_deref().unwrap();
    assert!(message.contains("inventory_ready"), "{message}");
    assert!(!message.contains("body ran"));
    assert_eq!(site.open_pages(), 0);
}

#[tokio::test]
async fn pages_do_not_share_sessions() {
    let (_site, browser) = site_browser();
    let first: Page = browser.new_page().await.unwrap();
    let second: Page = browser.new_page().await.unwrap();
    first.goto("/").await.unwrap();
    second.goto("/inventory.html").await.unwrap();

    let login = shopcheck::pages::LoginPage::new(&first);
    login.enter_username("standard_user").await.unwrap();
    login.enter_password("secret_sauce").await.unwrap();
    login.click_login().await.unwrap();
    assert!(first.url().await.unwrap().ends_with("/inventory.html"));

    // the second page was never logged in and got bounced to the form
    expect(&second.locator("[data-test=\"error\"]"))
        .to_contain_text("You can only access '/inventory.html' when you are logged in.")
        .await
        .unwrap();
    first.close().await.unwrap();
    second.close().await.unwrap();
}
