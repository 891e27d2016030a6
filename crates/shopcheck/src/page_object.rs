//! Page Object Model support.
//!
//! A page object wraps a [`Page`] handle and exposes named locators plus
//! one-action methods. It holds a clone of the handle and never closes it;
//! the `page` fixture owns the tab.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::browser::Page;
use crate::result::ShopcheckResult;

/// A page or region of the storefront UI.
///
/// # Example
///
/// ```ignore
/// struct LoginPage {
///     page: Page,
///     login_button: Locator,
/// }
///
/// impl PageObject for LoginPage {
///     fn url_pattern(&self) -> &str {
///         "/"
///     }
///
///     fn page(&self) -> &Page {
///         &self.page
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// URL path pattern that identifies this page (e.g., "/cart.html", "/users/*")
    fn url_pattern(&self) -> &str;

    /// Page handle the locators resolve against
    fn page(&self) -> &Page;

    /// Page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether the browser currently shows this page
    async fn is_current(&self) -> ShopcheckResult<bool> {
        let url = self.page().url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(path_of(&url)))
    }
}

/// Path portion of a URL: scheme, host, query and fragment removed
#[must_use]
pub fn path_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        rest.find('/').map_or("/", |i| &rest[i..])
    } else {
        rest
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/inventory.html`
    /// - Wildcards: `/static/*`
    /// - Named parameters: `/items/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    fn split(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Check if a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts = Self::split(path);
        // wildcards and parameters each consume exactly one segment
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(segment, part)| match segment {
                    UrlSegment::Literal(lit) => lit == part,
                    UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
                })
    }

    /// Extract named parameters from a path
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        let parts = Self::split(path);
        self.segments
            .iter()
            .zip(parts)
            .filter_map(|(segment, part)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), part.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
