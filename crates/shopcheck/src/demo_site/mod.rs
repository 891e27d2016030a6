//! In-process simulated storefront.
//!
//! [`DemoSite`] is a [`BrowserDriver`] whose pages render the demo shop
//! from a per-page [`store::Session`]: login form, inventory, item detail,
//! cart and side menu. Every query re-renders the current screen into a
//! [`dom::Dom`], so locators see state changes the same way they would on a
//! live page, including the deferred inventory of `performance_glitch_user`.

pub mod css;
pub mod dom;
pub mod render;
pub mod store;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use crate::driver::{BrowserDriver, ElementHandle, PageDriver};
use crate::locator::Step;
use crate::result::{ShopcheckError, ShopcheckResult};
use dom::Dom;
use store::{Route, Session};

/// Simulated browser; every page gets its own session
#[derive(Debug, Clone, Default)]
pub struct DemoSite {
    open: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl DemoSite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages opened and not yet closed
    #[must_use]
    pub fn open_pages(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Pages opened since the site was created
    #[must_use]
    pub fn pages_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for DemoSite {
    async fn new_page(&self) -> ShopcheckResult<Arc<dyn PageDriver>> {
        let _ = self.open.fetch_add(1, Ordering::SeqCst);
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(page = n, "simulated page opened");
        Ok(Arc::new(SimulatedPage {
            session: Mutex::new(Some(Session::new())),
            open: Arc::clone(&self.open),
        }))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// One simulated tab
#[derive(Debug)]
pub struct SimulatedPage {
    session: Mutex<Option<Session>>,
    open: Arc<AtomicUsize>,
}

impl SimulatedPage {
    /// Run `f` against the live session, applying any transition that is due
    fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> ShopcheckResult<T>) -> ShopcheckResult<T> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| ShopcheckError::page("page state lock poisoned"))?;
        let session = guard
            .as_mut()
            .ok_or_else(|| ShopcheckError::page("page is closed"))?;
        session.settle(Instant::now());
        f(session)
    }
}

fn detached(element: &ElementHandle) -> ShopcheckError {
    ShopcheckError::NotInteractable {
        selector: element.id.clone(),
        message: "element is no longer attached to the page".to_string(),
    }
}

#[async_trait]
impl PageDriver for SimulatedPage {
    async fn goto(&self, url: &str) -> ShopcheckResult<()> {
        self.with_session(|session| match session.goto(url) {
            Route::Screen(screen) => {
                debug!(url, ?screen, "simulated navigation");
                Ok(())
            }
            Route::NotFound => Err(ShopcheckError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            }),
        })
    }

    async fn current_url(&self) -> ShopcheckResult<String> {
        self.with_session(|session| Ok(session.url()))
    }

    async fn query(&self, steps: &[Step]) -> ShopcheckResult<Vec<ElementHandle>> {
        self.with_session(|session| {
            let dom = Dom::build(render::render(session));
            Ok(dom.query(steps)?.into_iter().map(|i| dom.handle(i)).collect())
        })
    }

    async fn click(&self, element: &ElementHandle) -> ShopcheckResult<()> {
        self.with_session(|session| {
            let dom = Dom::build(render::render(session));
            let idx = dom.find(&element.id).ok_or_else(|| detached(element))?;
            if !dom.is_enabled(idx) {
                return Err(ShopcheckError::NotInteractable {
                    selector: element.id.clone(),
                    message: "element is disabled".to_string(),
                });
            }
            match dom.action_for(idx) {
                Some(action) => {
                    debug!(element = %element.id, ?action, "simulated click");
                    session.apply(action, Instant::now());
                }
                None => debug!(element = %element.id, "click had no effect"),
            }
            Ok(())
        })
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> ShopcheckResult<()> {
        self.with_session(|session| {
            let dom = Dom::build(render::render(session));
            let idx = dom.find(&element.id).ok_or_else(|| detached(element))?;
            if !dom.is_editable(idx) {
                return Err(ShopcheckError::NotInteractable {
                    selector: element.id.clone(),
                    message: format!("<{}> does not accept text", dom.tag(idx)),
                });
            }
            let key = dom.attr(idx, "id").unwrap_or(&element.id).to_string();
            session.fill(&key, text);
            Ok(())
        })
    }

    async fn close(&self) -> ShopcheckResult<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| ShopcheckError::page("page state lock poisoned"))?;
        if guard.take().is_some() {
            let _ = self.open.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
