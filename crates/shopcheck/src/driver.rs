//! Browser automation boundary.
//!
//! Locators, page objects and fixtures only ever talk to a page through
//! [`PageDriver`]. Two implementations ship with the crate: the in-process
//! simulated storefront ([`crate::demo_site`]) and, behind the `browser`
//! feature, a Chromium driver speaking CDP ([`crate::browser`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::locator::Step;
use crate::result::ShopcheckResult;

/// Snapshot of one resolved element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier, valid until the page changes
    pub id: String,
    /// Lower-case tag name
    pub tag_name: String,
    /// Whitespace-normalized text content
    pub text_content: String,
    /// Whether the element is rendered and not hidden
    pub visible: bool,
    /// Whether the element accepts input
    pub enabled: bool,
}

impl ElementHandle {
    /// Create a visible, enabled handle with empty text
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: String::new(),
            visible: true,
            enabled: true,
        }
    }
}

/// A single page (tab) that locators resolve against.
///
/// Every method is a suspension point. Implementations resolve a chain of
/// [`Step`]s the same way: start from the document, select the descendants of
/// the current set that match each step's selector (in document order, no
/// duplicates), then apply that step's filters in order.
#[async_trait]
pub trait PageDriver: Debug + Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> ShopcheckResult<()>;

    /// Current absolute URL
    async fn current_url(&self) -> ShopcheckResult<String>;

    /// Resolve a selector chain to the currently matching elements
    async fn query(&self, steps: &[Step]) -> ShopcheckResult<Vec<ElementHandle>>;

    /// Click a previously resolved element
    async fn click(&self, element: &ElementHandle) -> ShopcheckResult<()>;

    /// Replace the value of a previously resolved input
    async fn fill(&self, element: &ElementHandle, text: &str) -> ShopcheckResult<()>;

    /// Close the page; later calls fail
    async fn close(&self) -> ShopcheckResult<()>;
}

/// Source of isolated pages
#[async_trait]
pub trait BrowserDriver: Debug + Send + Sync {
    /// Open a fresh page with no shared session state
    async fn new_page(&self) -> ShopcheckResult<Arc<dyn PageDriver>>;

    /// Shut the browser down
    async fn close(&self) -> ShopcheckResult<()> {
        Ok(())
    }

    /// Driver name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_defaults() {
        let handle = ElementHandle::new("e:0.1", "button");
        assert!(handle.visible);
        assert!(handle.enabled);
        assert!(handle.text_content.is_empty());
    }

    #[test]
    fn test_element_handle_deserializes_from_driver_json() {
        let handle: ElementHandle = serde_json::from_str(
            r#"{"id":"7","tag_name":"h3","text_content":"Epic sadface","visible":true,"enabled":true}"#,
        )
        .unwrap();
        assert_eq!(handle.tag_name, "h3");
        assert_eq!(handle.text_content, "Epic sadface");
    }
}
