//! Locator abstraction for element selection and interaction.
//!
//! # Design Philosophy
//!
//! - **Deferred**: building a locator never touches the page; the selector
//!   chain is resolved each time an action or query runs.
//! - **Auto-Waiting**: actions wait for the element to exist and be visible.
//! - **Strict Selection**: actions fail if more than one element matches.
//! - **Fluent API**: chainable methods narrow the selection step by step.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::browser::Page;
use crate::driver::ElementHandle;
use crate::result::{ShopcheckError, ShopcheckResult};
use crate::wait::{poll_until, Probe, WaitOptions, WaitOutcome};

/// ARIA roles understood by role selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    /// `<button>`, `<input type=submit|button>`
    Button,
    /// `<a href>`
    Link,
    /// Text-like `<input>` and `<textarea>`
    Textbox,
    /// `<h1>`..`<h6>`
    Heading,
    /// `<img>`
    Img,
    /// `<nav>`
    Navigation,
}

impl AriaRole {
    /// Role name as written in the `role` attribute
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Textbox => "textbox",
            Self::Heading => "heading",
            Self::Img => "img",
            Self::Navigation => "navigation",
        }
    }

    /// Parse a role attribute value
    #[must_use]
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "button" => Some(Self::Button),
            "link" => Some(Self::Link),
            "textbox" => Some(Self::Textbox),
            "heading" => Some(Self::Heading),
            "img" => Some(Self::Img),
            "navigation" => Some(Self::Navigation),
            _ => None,
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection strategy for one step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., `.inventory_item`, `[data-test="error"]`)
    Css {
        /// Selector source
        css: String,
    },
    /// ARIA role with an optional accessible name
    Role {
        /// Role to match
        role: AriaRole,
        /// Accessible name to match
        name: Option<String>,
        /// Whole-string, case-sensitive name match
        exact: bool,
    },
    /// Innermost element whose text matches
    Text {
        /// Text to match
        text: String,
        /// Whole-string, case-sensitive match
        exact: bool,
    },
    /// `data-test` attribute
    TestId {
        /// Attribute value
        id: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            css: selector.into(),
        }
    }

    /// Create a role selector matching any accessible name
    #[must_use]
    pub const fn role(role: AriaRole) -> Self {
        Self::Role {
            role,
            name: None,
            exact: false,
        }
    }

    /// Create a role selector with an accessible name
    #[must_use]
    pub fn role_named(role: AriaRole, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: Some(name.into()),
            exact: false,
        }
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create a `data-test` selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId { id: id.into() }
    }

    /// Switch name/text matching to exact
    #[must_use]
    pub fn exact(self) -> Self {
        match self {
            Self::Role { role, name, .. } => Self::Role {
                role,
                name,
                exact: true,
            },
            Self::Text { text, .. } => Self::Text { text, exact: true },
            other => other,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { css } => write!(f, "css={css}"),
            Self::Role { role, name, exact } => match name {
                Some(name) if *exact => write!(f, "role={role}[name={name:?}s]"),
                Some(name) => write!(f, "role={role}[name={name:?}i]"),
                None => write!(f, "role={role}"),
            },
            Self::Text { text, exact } => {
                if *exact {
                    write!(f, "text={text:?}s")
                } else {
                    write!(f, "text={text:?}i")
                }
            }
            Self::TestId { id } => write!(f, "test-id={id:?}"),
        }
    }
}

/// Narrowing applied to the elements matched by a step, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Keep elements with a descendant matching the chain
    Has {
        /// Chain resolved relative to each candidate
        steps: Vec<Step>,
    },
    /// Keep elements whose text contains the value (case-insensitive)
    HasText {
        /// Text to look for
        text: String,
    },
    /// Keep only the element at this index
    Nth {
        /// Zero-based index
        index: usize,
    },
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Has { steps } => write!(f, "has({})", render_steps(steps)),
            Self::HasText { text } => write!(f, "has-text={text:?}"),
            Self::Nth { index } => write!(f, "nth={index}"),
        }
    }
}

/// One link of a locator chain: a selector scoped to the previous step's
/// matches, followed by filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Selection strategy
    pub selector: Selector,
    /// Filters applied after selection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

impl Step {
    /// Create a step with no filters
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self {
            selector,
            filters: Vec::new(),
        }
    }
}

fn render_steps(steps: &[Step]) -> String {
    let mut parts = Vec::new();
    for step in steps {
        parts.push(step.selector.to_string());
        parts.extend(step.filters.iter().map(ToString::to_string));
    }
    parts.join(" >> ")
}

/// Collapse runs of whitespace to single spaces and trim the ends
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring match used for accessible names and text: whitespace-normalized,
/// case-insensitive unless `exact`, in which case the whole string must match
#[must_use]
pub fn text_matches(haystack: &str, needle: &str, exact: bool) -> bool {
    let haystack = normalize_whitespace(haystack);
    let needle = normalize_whitespace(needle);
    if exact {
        haystack == needle
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// A deferred reference to zero or more elements on a page
#[derive(Debug, Clone)]
pub struct Locator {
    page: Page,
    steps: Vec<Step>,
    options: WaitOptions,
}

impl Locator {
    /// Create a locator rooted at the page
    #[must_use]
    pub fn new(page: Page, selector: Selector) -> Self {
        let options = page.wait_options();
        Self {
            page,
            steps: vec![Step::new(selector)],
            options,
        }
    }

    /// Narrow to descendants matching the selector
    #[must_use]
    pub fn child(&self, selector: Selector) -> Self {
        let mut next = self.clone();
        next.steps.push(Step::new(selector));
        next
    }

    /// Narrow to descendants matching a CSS selector
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Self {
        self.child(Selector::css(css))
    }

    /// Narrow to descendants with the role and accessible name
    #[must_use]
    pub fn get_by_role(&self, role: AriaRole, name: impl Into<String>) -> Self {
        self.child(Selector::role_named(role, name))
    }

    /// Narrow to descendants whose text matches
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<String>) -> Self {
        self.child(Selector::text(text))
    }

    /// Narrow to descendants with the `data-test` id
    #[must_use]
    pub fn get_by_test_id(&self, id: impl Into<String>) -> Self {
        self.child(Selector::test_id(id))
    }

    fn with_filter(&self, filter: Filter) -> Self {
        let mut next = self.clone();
        if let Some(last) = next.steps.last_mut() {
            last.filters.push(filter);
        }
        next
    }

    /// Keep matches containing an element matched by `inner`, resolved
    /// relative to each match
    #[must_use]
    pub fn filter_has(&self, inner: &Self) -> Self {
        self.with_filter(Filter::Has {
            steps: inner.steps.clone(),
        })
    }

    /// Keep matches whose text contains `text`
    #[must_use]
    pub fn filter_has_text(&self, text: impl Into<String>) -> Self {
        self.with_filter(Filter::HasText { text: text.into() })
    }

    /// Keep only the match at `index`
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.with_filter(Filter::Nth { index })
    }

    /// Keep only the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Override the implicit wait for this locator
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Selector chain
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Wait options in effect
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Page this locator resolves against
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Resolve the chain once, without waiting
    pub async fn resolve(&self) -> ShopcheckResult<Vec<ElementHandle>> {
        self.page.driver().query(&self.steps).await
    }

    async fn probe_actionable(&self) -> ShopcheckResult<Probe<ElementHandle>> {
        let mut found = self.resolve().await?;
        match found.len() {
            0 => Ok(Probe::Pending("no matching elements".to_string())),
            1 => {
                let element = found.remove(0);
                if element.visible {
                    Ok(Probe::Ready(element))
                } else {
                    Ok(Probe::Pending("element is not visible".to_string()))
                }
            }
            count => Err(ShopcheckError::StrictModeViolation {
                selector: self.to_string(),
                count,
            }),
        }
    }

    /// Wait for exactly one visible element
    async fn actionable(&self, action: &str) -> ShopcheckResult<ElementHandle> {
        match poll_until(self.options, || self.probe_actionable()).await? {
            WaitOutcome::Ready(element) => Ok(element),
            WaitOutcome::TimedOut {
                waited_ms,
                last_observed,
            } => Err(ShopcheckError::LocatorTimeout {
                selector: self.to_string(),
                waited_ms,
                reason: format!("{action}: {last_observed}"),
            }),
        }
    }

    /// Click the element
    pub async fn click(&self) -> ShopcheckResult<()> {
        let element = self.actionable("click").await?;
        debug!(selector = %self, element = %element.id, "click");
        self.page.driver().click(&element).await
    }

    /// Replace the element's value with `text`
    pub async fn fill(&self, text: &str) -> ShopcheckResult<()> {
        let element = self.actionable("fill").await?;
        if !element.enabled {
            return Err(ShopcheckError::NotInteractable {
                selector: self.to_string(),
                message: "element is disabled".to_string(),
            });
        }
        debug!(selector = %self, element = %element.id, chars = text.len(), "fill");
        self.page.driver().fill(&element, text).await
    }

    /// Text content of the single matching element, waiting for it to exist
    pub async fn text_content(&self) -> ShopcheckResult<String> {
        let outcome = poll_until(self.options, || async move {
            let mut found = self.resolve().await?;
            match found.len() {
                0 => Ok(Probe::Pending("no matching elements".to_string())),
                1 => Ok(Probe::Ready(found.remove(0).text_content)),
                count => Err(ShopcheckError::StrictModeViolation {
                    selector: self.to_string(),
                    count,
                }),
            }
        })
        .await?;
        match outcome {
            WaitOutcome::Ready(text) => Ok(text),
            WaitOutcome::TimedOut {
                waited_ms,
                last_observed,
            } => Err(ShopcheckError::LocatorTimeout {
                selector: self.to_string(),
                waited_ms,
                reason: format!("text_content: {last_observed}"),
            }),
        }
    }

    /// Text content of every current match, without waiting
    pub async fn all_text_contents(&self) -> ShopcheckResult<Vec<String>> {
        Ok(self
            .resolve()
            .await?
            .into_iter()
            .map(|e| e.text_content)
            .collect())
    }

    /// Number of current matches, without waiting
    pub async fn count(&self) -> ShopcheckResult<usize> {
        Ok(self.resolve().await?.len())
    }

    /// Whether the first current match is visible, without waiting
    pub async fn is_visible(&self) -> ShopcheckResult<bool> {
        Ok(self.resolve().await?.first().is_some_and(|e| e.visible))
    }

    /// One locator per current match
    pub async fn all(&self) -> ShopcheckResult<Vec<Self>> {
        let count = self.count().await?;
        Ok((0..count).map(|i| self.nth(i)).collect())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_steps(&self.steps))
    }
}
