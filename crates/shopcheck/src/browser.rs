//! Browser and page handles.
//!
//! A [`Browser`] hands out isolated [`Page`]s. A `Page` is a cheap, cloneable
//! handle over a [`PageDriver`]; page objects keep clones of it but never
//! close it. Closing belongs to whoever opened it (the `page` fixture).
//!
//! With the `browser` feature, [`Browser::launch`] can drive a real Chromium
//! over CDP via chromiumoxide. Without it, only the simulated storefront is
//! available.

use std::sync::Arc;
use tracing::debug;

use crate::config::{RunConfig, Target};
use crate::demo_site::DemoSite;
use crate::driver::{BrowserDriver, PageDriver};
use crate::locator::{AriaRole, Locator, Selector};
use crate::result::ShopcheckResult;
#[cfg(not(feature = "browser"))]
use crate::result::ShopcheckError;
use crate::wait::WaitOptions;

/// Chromium launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

impl From<&RunConfig> for BrowserConfig {
    fn from(config: &RunConfig) -> Self {
        let mut browser = Self::default().with_headless(config.headless);
        if let Some(path) = &config.chromium_path {
            browser = browser.with_chromium_path(path.clone());
        }
        if !config.sandbox {
            browser = browser.with_no_sandbox();
        }
        browser
    }
}

/// Join a possibly relative URL onto the base URL
#[must_use]
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.contains("://") || url.starts_with("about:") || url.starts_with("data:") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// Browser handle: a driver plus the settings every page inherits
#[derive(Debug, Clone)]
pub struct Browser {
    driver: Arc<dyn BrowserDriver>,
    base_url: Arc<str>,
    wait: WaitOptions,
}

impl Browser {
    /// Wrap an existing driver
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: Arc::from(base_url.into()),
            wait: WaitOptions::default(),
        }
    }

    /// Browser over a fresh simulated storefront
    #[must_use]
    pub fn simulated(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(DemoSite::new()), base_url)
    }

    /// Start the browser selected by the run configuration
    pub async fn launch(config: &RunConfig) -> ShopcheckResult<Self> {
        let browser = match config.target {
            Target::Simulated => Self::simulated(config.base_url.clone()),
            #[cfg(feature = "browser")]
            Target::Chromium => {
                let driver = cdp::ChromiumBrowser::launch(&BrowserConfig::from(config)).await?;
                Self::new(Arc::new(driver), config.base_url.clone())
            }
            #[cfg(not(feature = "browser"))]
            Target::Chromium => {
                return Err(ShopcheckError::config(
                    "target 'chromium' needs the 'browser' feature; rebuild with --features browser",
                ))
            }
        };
        debug!(driver = browser.driver.name(), base_url = %browser.base_url, "browser ready");
        Ok(browser.with_wait_options(config.wait_options()))
    }

    /// Set the implicit wait inherited by every page
    #[must_use]
    pub const fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Open an isolated page
    pub async fn new_page(&self) -> ShopcheckResult<Page> {
        let driver = self.driver.new_page().await?;
        Ok(Page {
            driver,
            base_url: self.base_url.clone(),
            wait: self.wait,
        })
    }

    /// Base URL relative navigation resolves against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Name of the underlying driver
    #[must_use]
    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Shut the browser down
    pub async fn close(&self) -> ShopcheckResult<()> {
        self.driver.close().await
    }
}

/// Handle to one page; clones share the same tab
#[derive(Debug, Clone)]
pub struct Page {
    driver: Arc<dyn PageDriver>,
    base_url: Arc<str>,
    wait: WaitOptions,
}

impl Page {
    /// Wrap a page driver directly
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: Arc::from(base_url.into()),
            wait: WaitOptions::default(),
        }
    }

    pub(crate) fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Implicit wait inherited by locators
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        self.wait
    }

    /// Navigate; relative URLs resolve against the base URL
    pub async fn goto(&self, url: &str) -> ShopcheckResult<()> {
        let target = resolve_url(&self.base_url, url);
        debug!(url = %target, "goto");
        self.driver.goto(&target).await
    }

    /// Current absolute URL
    pub async fn url(&self) -> ShopcheckResult<String> {
        self.driver.current_url().await
    }

    /// Close the page
    pub async fn close(&self) -> ShopcheckResult<()> {
        debug!("closing page");
        self.driver.close().await
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Locator {
        Locator::new(self.clone(), Selector::css(css))
    }

    /// Locate by ARIA role and accessible name
    #[must_use]
    pub fn get_by_role(&self, role: AriaRole, name: impl Into<String>) -> Locator {
        Locator::new(self.clone(), Selector::role_named(role, name))
    }

    /// Locate every element with the ARIA role
    #[must_use]
    pub fn get_by_any_role(&self, role: AriaRole) -> Locator {
        Locator::new(self.clone(), Selector::role(role))
    }

    /// Locate the innermost element whose text contains `text`
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<String>) -> Locator {
        Locator::new(self.clone(), Selector::text(text))
    }

    /// Locate by `data-test` attribute
    #[must_use]
    pub fn get_by_test_id(&self, id: impl Into<String>) -> Locator {
        Locator::new(self.clone(), Selector::test_id(id))
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{BrowserDriver, ElementHandle, PageDriver};
    use crate::locator::Step;
    use crate::result::{ShopcheckError, ShopcheckResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Resolves a JSON step chain in the page. Mirrors the simulated
    /// storefront's matching rules.
    const RESOLVER_JS: &str = r#"(steps) => {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const matches = (hay, needle, exact) => exact
    ? norm(hay) === norm(needle)
    : norm(hay).toLowerCase().includes(norm(needle).toLowerCase());
  const visible = (el) => {
    const st = getComputedStyle(el);
    return st.visibility !== 'hidden' && st.display !== 'none' && el.getClientRects().length > 0;
  };
  const inputType = (el) => (el.getAttribute('type') || 'text').toLowerCase();
  const roleOf = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit.toLowerCase();
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'input' && ['submit', 'button', 'reset'].includes(inputType(el))) return 'button';
    if (tag === 'input' && ['text', 'password', 'email', 'search', 'tel', 'url'].includes(inputType(el))) return 'textbox';
    if (tag === 'textarea') return 'textbox';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    if (tag === 'img') return 'img';
    if (tag === 'nav') return 'navigation';
    return null;
  };
  const nameOf = (el) => {
    if (el.getAttribute('aria-label')) return el.getAttribute('aria-label');
    const role = roleOf(el);
    if (el.tagName === 'INPUT' && role === 'button') return el.value || '';
    if (role === 'textbox') return el.getAttribute('placeholder') || '';
    if (el.tagName === 'IMG') return el.getAttribute('alt') || '';
    return el.textContent || '';
  };
  const skip = new Set(['SCRIPT', 'STYLE', 'HEAD', 'NOSCRIPT']);
  const descendants = (scope) => Array.from(scope.querySelectorAll('*')).filter((el) => !skip.has(el.tagName));
  const select = (scope, sel) => {
    switch (sel.kind) {
      case 'css': return Array.from(scope.querySelectorAll(sel.css));
      case 'test_id': return Array.from(scope.querySelectorAll('[data-test="' + CSS.escape(sel.id) + '"]'));
      case 'role': return descendants(scope).filter((el) => roleOf(el) === sel.role && visible(el)
        && (sel.name == null || matches(nameOf(el), sel.name, sel.exact)));
      case 'text': return (scope.nodeType === 1 ? [scope] : []).concat(descendants(scope))
        .filter((el) => !skip.has(el.tagName) && matches(el.textContent, sel.text, sel.exact)
        && !Array.from(el.children).some((c) => matches(c.textContent, sel.text, sel.exact)));
      default: return [];
    }
  };
  const run = (roots, chain) => {
    let current = roots;
    for (const step of chain) {
      const seen = new Set();
      let next = [];
      for (const scope of current) {
        for (const el of select(scope, step.selector)) {
          if (!seen.has(el)) { seen.add(el); next.push(el); }
        }
      }
      next.sort((a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1);
      for (const f of (step.filters || [])) {
        if (f.kind === 'has') next = next.filter((el) => run([el], f.steps).length > 0);
        else if (f.kind === 'has_text') next = next.filter((el) => matches(el.textContent, f.text, false));
        else if (f.kind === 'nth') next = next.length > f.index ? [next[f.index]] : [];
      }
      current = next;
    }
    return current;
  };
  window.__shopcheckSeq = window.__shopcheckSeq || 0;
  return run([document], steps).map((el) => {
    if (!el.dataset.shopcheckId) el.dataset.shopcheckId = String(++window.__shopcheckSeq);
    return {
      id: el.dataset.shopcheckId,
      tag_name: el.tagName.toLowerCase(),
      text_content: norm(el.textContent),
      visible: visible(el),
      enabled: !el.disabled,
    };
  });
}"#;

    const CLICK_JS: &str = r#"(id) => {
  const el = document.querySelector('[data-shopcheck-id="' + id + '"]');
  if (!el) return false;
  el.scrollIntoView({ block: 'center' });
  el.click();
  return true;
}"#;

    const FILL_JS: &str = r#"(id, text) => {
  const el = document.querySelector('[data-shopcheck-id="' + id + '"]');
  if (!el) return false;
  const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
  Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, text);
  el.dispatchEvent(new Event('input', { bubbles: true }));
  el.dispatchEvent(new Event('change', { bubbles: true }));
  return true;
}"#;

    fn page_err(e: impl std::fmt::Display) -> ShopcheckError {
        ShopcheckError::page(e.to_string())
    }

    /// Chromium driven over CDP
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch Chromium
        pub async fn launch(config: &BrowserConfig) -> ShopcheckResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ShopcheckError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ShopcheckError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }
    }

    #[async_trait]
    impl BrowserDriver for ChromiumBrowser {
        async fn new_page(&self) -> ShopcheckResult<Arc<dyn PageDriver>> {
            let browser = self.inner.lock().await;
            let page = browser.new_page("about:blank").await.map_err(page_err)?;
            Ok(Arc::new(ChromiumPage { inner: page }))
        }

        async fn close(&self) -> ShopcheckResult<()> {
            let mut browser = self.inner.lock().await;
            let _ = browser.close().await.map_err(page_err)?;
            self.handle.abort();
            Ok(())
        }

        fn name(&self) -> &str {
            "chromium"
        }
    }

    /// One Chromium tab
    #[derive(Debug)]
    pub struct ChromiumPage {
        inner: CdpPage,
    }

    impl ChromiumPage {
        async fn eval<T: DeserializeOwned>(&self, expression: String) -> ShopcheckResult<T> {
            let params = EvaluateParams::builder()
                .expression(expression)
                .return_by_value(true)
                .build()
                .map_err(page_err)?;
            let result = self
                .inner
                .evaluate_expression(params)
                .await
                .map_err(page_err)?;
            result.into_value().map_err(page_err)
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&self, url: &str) -> ShopcheckResult<()> {
            let _ = self
                .inner
                .goto(url)
                .await
                .map_err(|e| ShopcheckError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> ShopcheckResult<String> {
            Ok(self
                .inner
                .url()
                .await
                .map_err(page_err)?
                .unwrap_or_default())
        }

        async fn query(&self, steps: &[Step]) -> ShopcheckResult<Vec<ElementHandle>> {
            let chain = serde_json::to_string(steps)?;
            self.eval(format!("({RESOLVER_JS})({chain})")).await
        }

        async fn click(&self, element: &ElementHandle) -> ShopcheckResult<()> {
            let id = serde_json::to_string(&element.id)?;
            let clicked: bool = self.eval(format!("({CLICK_JS})({id})")).await?;
            if clicked {
                Ok(())
            } else {
                Err(ShopcheckError::page(format!(
                    "element {} is no longer attached",
                    element.id
                )))
            }
        }

        async fn fill(&self, element: &ElementHandle, text: &str) -> ShopcheckResult<()> {
            let id = serde_json::to_string(&element.id)?;
            let text = serde_json::to_string(text)?;
            let filled: bool = self.eval(format!("({FILL_JS})({id}, {text})")).await?;
            if filled {
                Ok(())
            } else {
                Err(ShopcheckError::page(format!(
                    "element {} is no longer attached",
                    element.id
                )))
            }
        }

        async fn close(&self) -> ShopcheckResult<()> {
            self.inner.clone().close().await.map_err(page_err)
        }
    }
}
