//! Fixture composition.
//!
//! A fixture is a named value a test asks for. It may depend on other
//! fixtures, run async setup before it is handed out, and run async teardown
//! after the test finishes, whatever the outcome.
//!
//! ```ignore
//! let set = FixtureSet::new("login")
//!     .option("user", Credentials::default())
//!     .fixture("login_page", &["page"], |ctx| async move {
//!         let page = ctx.get::<Page>("page")?;
//!         let login = LoginPage::new(&page);
//!         login.go_to().await?;
//!         Ok(login)
//!     });
//! ```
//!
//! Sets merge by name ([`FixtureSet::merge`]). A [`FixtureScope`] belongs to a
//! single test: it sets each fixture up at most once, in dependency order, and
//! tears completed fixtures down in reverse order exactly once.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::result::{ShopcheckError, ShopcheckResult};

/// Type-erased fixture value, shared by reference within one test
pub type FixtureValue = Arc<dyn Any + Send + Sync>;

type SetupFn = Arc<dyn Fn(TestContext) -> BoxFuture<'static, ShopcheckResult<FixtureValue>> + Send + Sync>;
type TeardownFn = Arc<dyn Fn(FixtureValue) -> BoxFuture<'static, ShopcheckResult<()>> + Send + Sync>;

enum FixtureKind {
    Setup {
        setup: SetupFn,
        teardown: Option<TeardownFn>,
    },
    /// Static default that individual tests may override
    Option { default: FixtureValue },
}

struct FixtureDef {
    deps: Vec<String>,
    kind: FixtureKind,
    value_type: TypeId,
    type_name: &'static str,
}

/// A value overriding an option fixture for one test
#[derive(Clone)]
pub struct OptionValue {
    value: FixtureValue,
    value_type: TypeId,
    type_name: &'static str,
}

impl OptionValue {
    /// Wrap a value
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            value_type: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionValue")
            .field("type", &self.type_name)
            .finish()
    }
}

/// Fixtures visible to a setup closure or a test body
#[derive(Clone, Default)]
pub struct TestContext {
    values: HashMap<String, FixtureValue>,
}

impl TestContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a fixture value by name
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> ShopcheckResult<Arc<T>> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ShopcheckError::UnknownFixture {
                name: name.to_string(),
            })?;
        Arc::clone(value).downcast::<T>().map_err(|_| {
            ShopcheckError::fixture(format!(
                "fixture '{name}' is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Whether the fixture is available
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Available fixture names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, name: &str, value: FixtureValue) {
        let _ = self.values.insert(name.to_string(), value);
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("fixtures", &self.names())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// A named collection of fixture definitions
#[derive(Clone, Default)]
pub struct FixtureSet {
    name: String,
    defs: HashMap<String, Arc<FixtureDef>>,
    order: Vec<String>,
}

impl FixtureSet {
    /// Create an empty set
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn define(mut self, name: &str, def: FixtureDef) -> Self {
        if self.defs.insert(name.to_string(), Arc::new(def)).is_none() {
            self.order.push(name.to_string());
        }
        self
    }

    fn setup_fn<T, F, Fut>(setup: F) -> SetupFn
    where
        T: Send + Sync + 'static,
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ShopcheckResult<T>> + Send + 'static,
    {
        Arc::new(move |ctx| {
            let fut = setup(ctx);
            async move { Ok(Arc::new(fut.await?) as FixtureValue) }.boxed()
        })
    }

    /// Define a fixture built by `setup` once its dependencies are ready
    #[must_use]
    pub fn fixture<T, F, Fut>(self, name: &str, deps: &[&str], setup: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ShopcheckResult<T>> + Send + 'static,
    {
        self.define(
            name,
            FixtureDef {
                deps: deps.iter().map(ToString::to_string).collect(),
                kind: FixtureKind::Setup {
                    setup: Self::setup_fn(setup),
                    teardown: None,
                },
                value_type: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        )
    }

    /// Define a fixture with a teardown that runs after the test
    #[must_use]
    pub fn fixture_with_teardown<T, F, Fut, G, TFut>(
        self,
        name: &str,
        deps: &[&str],
        setup: F,
        teardown: G,
    ) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ShopcheckResult<T>> + Send + 'static,
        G: Fn(Arc<T>) -> TFut + Send + Sync + 'static,
        TFut: Future<Output = ShopcheckResult<()>> + Send + 'static,
    {
        let fixture_name = name.to_string();
        let teardown: TeardownFn = Arc::new(move |value: FixtureValue| match value.downcast::<T>() {
            Ok(value) => teardown(value).boxed(),
            Err(_) => {
                let message = format!("fixture '{fixture_name}' holds an unexpected type");
                async move { Err(ShopcheckError::fixture(message)) }.boxed()
            }
        });
        self.define(
            name,
            FixtureDef {
                deps: deps.iter().map(ToString::to_string).collect(),
                kind: FixtureKind::Setup {
                    setup: Self::setup_fn(setup),
                    teardown: Some(teardown),
                },
                value_type: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        )
    }

    /// Define an option: a static default that tests may override
    #[must_use]
    pub fn option<T: Send + Sync + 'static>(self, name: &str, default: T) -> Self {
        self.define(
            name,
            FixtureDef {
                deps: Vec::new(),
                kind: FixtureKind::Option {
                    default: Arc::new(default),
                },
                value_type: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        )
    }

    /// Add every definition of `other`; a name already present is replaced
    pub fn extend(&mut self, other: &Self) {
        for name in &other.order {
            if let Some(def) = other.defs.get(name) {
                if self.defs.insert(name.clone(), Arc::clone(def)).is_none() {
                    self.order.push(name.clone());
                }
            }
        }
    }

    /// Union of several sets by name; later definitions win
    #[must_use]
    pub fn merge<'a>(name: impl Into<String>, sets: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut merged = Self::new(name);
        for set in sets {
            merged.extend(set);
        }
        merged
    }

    /// Set name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixture names in definition order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Whether a fixture is defined
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Whether `name` is an overridable option
    #[must_use]
    pub fn is_option(&self, name: &str) -> bool {
        self.defs
            .get(name)
            .is_some_and(|def| matches!(def.kind, FixtureKind::Option { .. }))
    }

    /// Number of fixtures
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Reject unknown dependencies and dependency cycles
    pub fn validate(&self) -> ShopcheckResult<()> {
        for name in &self.order {
            if let Some(def) = self.defs.get(name) {
                if let Some(dep) = def.deps.iter().find(|dep| !self.defs.contains_key(*dep)) {
                    return Err(ShopcheckError::fixture(format!(
                        "fixture '{name}' depends on unknown fixture '{dep}'"
                    )));
                }
            }
        }
        let all: Vec<&str> = self.names();
        let _ = self.setup_order(&all)?;
        Ok(())
    }

    /// Dependency-first order of `requested` and everything it depends on
    pub fn setup_order(&self, requested: &[&str]) -> ShopcheckResult<Vec<String>> {
        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        let mut order = Vec::new();
        for name in requested {
            self.visit(name, &mut marks, &mut stack, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        marks: &mut HashMap<String, Mark>,
        stack: &mut Vec<String>,
        order: &mut Vec<String>,
    ) -> ShopcheckResult<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| n == name).unwrap_or(0);
                let mut path = stack[start..].to_vec();
                path.push(name.to_string());
                return Err(ShopcheckError::FixtureCycle { path });
            }
            None => {}
        }
        let def = self
            .defs
            .get(name)
            .ok_or_else(|| ShopcheckError::UnknownFixture {
                name: name.to_string(),
            })?;
        let _ = marks.insert(name.to_string(), Mark::Visiting);
        stack.push(name.to_string());
        for dep in &def.deps {
            self.visit(dep, marks, stack, order)?;
        }
        let _ = stack.pop();
        let _ = marks.insert(name.to_string(), Mark::Done);
        order.push(name.to_string());
        Ok(())
    }
}

impl fmt::Debug for FixtureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureSet")
            .field("name", &self.name)
            .field("fixtures", &self.order)
            .finish()
    }
}

/// Fixture instances for one test
pub struct FixtureScope {
    set: Arc<FixtureSet>,
    overrides: HashMap<String, OptionValue>,
    values: HashMap<String, FixtureValue>,
    completed: Vec<String>,
    torn_down: bool,
}

impl FixtureScope {
    /// Create a scope; nothing is set up until [`FixtureScope::resolve`]
    #[must_use]
    pub fn new(set: Arc<FixtureSet>, overrides: HashMap<String, OptionValue>) -> Self {
        Self {
            set,
            overrides,
            values: HashMap::new(),
            completed: Vec::new(),
            torn_down: false,
        }
    }

    fn check_overrides(&self) -> ShopcheckResult<()> {
        for (name, value) in &self.overrides {
            let def = self
                .set
                .defs
                .get(name)
                .ok_or_else(|| ShopcheckError::UnknownFixture { name: name.clone() })?;
            if !matches!(def.kind, FixtureKind::Option { .. }) {
                return Err(ShopcheckError::fixture(format!(
                    "'{name}' is not an option and cannot be overridden"
                )));
            }
            if def.value_type != value.value_type {
                return Err(ShopcheckError::fixture(format!(
                    "option '{name}' expects {}, got {}",
                    def.type_name, value.type_name
                )));
            }
        }
        Ok(())
    }

    /// Set up `names` and their dependencies, each at most once, and return
    /// a context holding the requested fixtures.
    ///
    /// On a setup failure nothing that depends on the failed fixture runs;
    /// fixtures already set up stay recorded for [`FixtureScope::teardown`].
    pub async fn resolve(&mut self, names: &[&str]) -> ShopcheckResult<TestContext> {
        self.check_overrides()?;
        let order = self.set.setup_order(names)?;
        let set = Arc::clone(&self.set);

        for name in &order {
            if self.values.contains_key(name) {
                continue;
            }
            let Some(def) = set.defs.get(name) else {
                return Err(ShopcheckError::UnknownFixture { name: name.clone() });
            };
            let value = match &def.kind {
                FixtureKind::Option { default } => self
                    .overrides
                    .get(name)
                    .map_or_else(|| Arc::clone(default), |o| Arc::clone(&o.value)),
                FixtureKind::Setup { setup, .. } => {
                    let mut deps = TestContext::new();
                    for dep in &def.deps {
                        if let Some(value) = self.values.get(dep) {
                            deps.insert(dep, Arc::clone(value));
                        }
                    }
                    debug!(fixture = %name, "setup");
                    setup(deps).await.map_err(|e| {
                        ShopcheckError::fixture(format!("fixture '{name}' setup failed: {e}"))
                    })?
                }
            };
            let _ = self.values.insert(name.clone(), value);
            self.completed.push(name.clone());
        }

        let mut ctx = TestContext::new();
        for name in names {
            if let Some(value) = self.values.get(*name) {
                ctx.insert(name, Arc::clone(value));
            }
        }
        Ok(ctx)
    }

    /// Fixtures set up so far, in setup order
    #[must_use]
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Tear down completed fixtures in reverse setup order.
    ///
    /// Runs at most once per scope; later calls do nothing. Every teardown
    /// runs even if an earlier one fails; the first error is returned.
    pub async fn teardown(&mut self) -> ShopcheckResult<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        let mut first_error: Option<ShopcheckError> = None;
        for name in self.completed.iter().rev() {
            let Some(def) = self.set.defs.get(name) else {
                continue;
            };
            let FixtureKind::Setup {
                teardown: Some(teardown),
                ..
            } = &def.kind
            else {
                continue;
            };
            let Some(value) = self.values.get(name) else {
                continue;
            };
            debug!(fixture = %name, "teardown");
            if let Err(e) = teardown(Arc::clone(value)).await {
                warn!(fixture = %name, error = %e, "fixture teardown failed");
                let _ = first_error.get_or_insert_with(|| {
                    ShopcheckError::fixture(format!("fixture '{name}' teardown failed: {e}"))
                });
            }
        }
        self.values.clear();

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for FixtureScope {
    fn drop(&mut self) {
        if !self.torn_down && !self.completed.is_empty() {
            warn!(
                fixtures = ?self.completed,
                "fixture scope dropped without teardown"
            );
        }
    }
}

impl fmt::Debug for FixtureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureScope")
            .field("set", &self.set.name)
            .field("completed", &self.completed)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
