//! Auto-waiting assertions on locators (Playwright's `expect()`).
//!
//! ```ignore
//! expect(&login_page.login_error).to_contain_text("Username is required").await?;
//! expect(&login_page.login_button).to_be_visible().await?;
//! ```
//!
//! Each assertion re-resolves the locator until it holds or the implicit wait
//! elapses. A failure reports the expected value and the last observed one.

use crate::driver::ElementHandle;
use crate::locator::{normalize_whitespace, Locator};
use crate::result::{ShopcheckError, ShopcheckResult};
use crate::wait::{poll_until, Probe, WaitOptions, WaitOutcome};

/// Assertion builder for a locator
#[derive(Debug, Clone)]
pub struct Expect {
    locator: Locator,
    options: WaitOptions,
}

/// Create an expectation for a locator
#[must_use]
pub fn expect(locator: &Locator) -> Expect {
    Expect::new(locator.clone())
}

fn describe(elements: &[ElementHandle]) -> String {
    if elements.is_empty() {
        return "<no elements>".to_string();
    }
    elements
        .iter()
        .map(|e| format!("{:?}", e.text_content))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Expect {
    /// Create a new expectation
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        let options = locator.options();
        Self { locator, options }
    }

    /// Override how long the assertion keeps retrying
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    async fn check<F>(&self, assertion: &str, expected: String, probe: F) -> ShopcheckResult<()>
    where
        F: Fn(Vec<ElementHandle>) -> ShopcheckResult<Probe<()>>,
    {
        let probe = &probe;
        let outcome = poll_until(self.options, || async move {
            probe(self.locator.resolve().await?)
        })
        .await?;
        match outcome {
            WaitOutcome::Ready(()) => Ok(()),
            WaitOutcome::TimedOut { last_observed, .. } => Err(ShopcheckError::AssertionFailed {
                assertion: assertion.to_string(),
                selector: self.locator.to_string(),
                expected,
                actual: last_observed,
            }),
        }
    }

    fn strict_single(&self, elements: &[ElementHandle]) -> ShopcheckResult<()> {
        if elements.len() > 1 {
            return Err(ShopcheckError::StrictModeViolation {
                selector: self.locator.to_string(),
                count: elements.len(),
            });
        }
        Ok(())
    }

    /// The single matching element is visible
    pub async fn to_be_visible(&self) -> ShopcheckResult<()> {
        self.check("to_be_visible", "visible".to_string(), |found| {
            self.strict_single(&found)?;
            Ok(match found.first() {
                None => Probe::Pending("not attached".to_string()),
                Some(e) if e.visible => Probe::Ready(()),
                Some(_) => Probe::Pending("hidden".to_string()),
            })
        })
        .await
    }

    /// No element matches, or the single match is hidden
    pub async fn to_be_hidden(&self) -> ShopcheckResult<()> {
        self.check("to_be_hidden", "hidden".to_string(), |found| {
            self.strict_single(&found)?;
            Ok(match found.first() {
                Some(e) if e.visible => Probe::Pending("visible".to_string()),
                _ => Probe::Ready(()),
            })
        })
        .await
    }

    /// Some matching element's text contains `expected` (case-sensitive,
    /// whitespace-normalized)
    pub async fn to_contain_text(&self, expected: &str) -> ShopcheckResult<()> {
        let needle = normalize_whitespace(expected);
        self.check("to_contain_text", needle.clone(), |found| {
            if found.iter().any(|e| e.text_content.contains(&needle)) {
                Ok(Probe::Ready(()))
            } else {
                Ok(Probe::Pending(describe(&found)))
            }
        })
        .await
    }

    /// The single matching element's text equals `expected`
    pub async fn to_have_text(&self, expected: &str) -> ShopcheckResult<()> {
        let wanted = normalize_whitespace(expected);
        self.check("to_have_text", wanted.clone(), |found| {
            self.strict_single(&found)?;
            Ok(match found.first() {
                Some(e) if e.text_content == wanted => Probe::Ready(()),
                _ => Probe::Pending(describe(&found)),
            })
        })
        .await
    }

    /// Exactly `count` elements match
    pub async fn to_have_count(&self, count: usize) -> ShopcheckResult<()> {
        self.check("to_have_count", count.to_string(), |found| {
            if found.len() == count {
                Ok(Probe::Ready(()))
            } else {
                Ok(Probe::Pending(found.len().to_string()))
            }
        })
        .await
    }

    /// At least one element matches (`attached = true`) or none does
    pub async fn to_be_attached(&self, attached: bool) -> ShopcheckResult<()> {
        let label = |yes: bool| if yes { "attached" } else { "detached" };
        self.check("to_be_attached", label(attached).to_string(), |found| {
            if found.is_empty() == attached {
                Ok(Probe::Pending(label(!attached).to_string()))
            } else {
                Ok(Probe::Ready(()))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{Browser, Page};
    use crate::locator::AriaRole;

    async fn login_screen() -> Page {
        let page = Browser::simulated("https://www.saucedemo.com")
            .new_page()
            .await
            .unwrap();
        page.goto("/").await.unwrap();
        page
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&[]), "<no elements>");
        let mut a = ElementHandle::new("1", "div");
        a.text_content = "one".to_string();
        let mut b = ElementHandle::new("2", "div");
        b.text_content = "two".to_string();
        assert_eq!(describe(&[a, b]), "\"one\", \"two\"");
    }

    #[tokio::test]
    async fn test_visible_and_attached() {
        let page = login_screen().await;
        let button = page.get_by_role(AriaRole::Button, "LOGIN");
        expect(&button).to_be_visible().await.unwrap();
        expect(&button).to_be_attached(true).await.unwrap();
        expect(&page.locator("[data-test=\"error\"]"))
            .to_be_attached(false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_contain_text_failure_reports_expected_and_actual() {
        let page = login_screen().await;
        page.get_by_role(AriaRole::Button, "LOGIN")
            .click()
            .await
            .unwrap();
        let err = expect(&page.locator("[data-test=\"error\"]"))
            .with_timeout(30)
            .to_contain_text("Password is required")
            .await
            .unwrap_err();
        match err {
            ShopcheckError::AssertionFailed {
                assertion,
                expected,
                actual,
                ..
            } => {
                assert_eq!(assertion, "to_contain_text");
                assert_eq!(expected, "Password is required");
                assert!(actual.contains("Username is required"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_to_have_count() {
        let page = login_screen().await;
        expect(&page.locator("input")).to_have_count(3).await.unwrap();
        let err = expect(&page.locator("input"))
            .with_timeout(20)
            .to_have_count(2)
            .await
            .unwrap_err();
        assert!(err.is_assertion());
    }

    #[tokio::test]
    async fn test_hidden_menu_link() {
        let page = login_screen().await;
        expect(&page.locator("#logout_sidebar_link"))
            .to_be_hidden()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_to_have_text_is_strict() {
        let page = login_screen().await;
        let err = expect(&page.locator("input"))
            .to_have_text("")
            .await
            .unwrap_err();
        assert!(matches!(err, ShopcheckError::StrictModeViolation { .. }));
    }
}
