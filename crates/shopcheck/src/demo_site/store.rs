//! Storefront state: catalogue, accounts and the per-page session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::page_object::path_of;

/// Password every demo account shares
pub const PASSWORD: &str = "secret_sauce";

/// Accounts that can log in
pub const ACCEPTED_USERS: &[&str] = &[
    "standard_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// Account that exists but is refused
pub const LOCKED_OUT_USER: &str = "locked_out_user";

/// Prefix the storefront puts on every error banner
pub const ERROR_PREFIX: &str = "Epic sadface: ";

/// How long `performance_glitch_user` waits before the inventory appears
pub const GLITCH_DELAY: Duration = Duration::from_millis(250);

/// A catalogue entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
}

impl Product {
    /// Price as displayed, e.g. `$29.99`
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// Lower-case, dash-separated name used in element ids
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}

/// Inventory in display order
pub const CATALOGUE: &[Product] = &[
    Product {
        id: 4,
        name: "Sauce Labs Backpack",
        description: "A roomy everyday pack with a padded laptop sleeve and water-resistant shell.",
        price: 29.99,
    },
    Product {
        id: 0,
        name: "Sauce Labs Bike Light",
        description: "Three brightness modes and a USB charger keep night rides visible.",
        price: 9.99,
    },
    Product {
        id: 1,
        name: "Sauce Labs Bolt T-Shirt",
        description: "Soft ringspun cotton tee with a lightning print for release days.",
        price: 15.99,
    },
    Product {
        id: 5,
        name: "Sauce Labs Fleece Jacket",
        description: "Midweight quarter-zip fleece for cold offices and colder server rooms.",
        price: 49.99,
    },
    Product {
        id: 2,
        name: "Sauce Labs Onesie",
        description: "Snap-button infant romper in two-ply cotton, built to survive laundry.",
        price: 7.99,
    },
    Product {
        id: 3,
        name: "Test.allTheThings() T-Shirt (Red)",
        description: "Classic red crew neck for anyone who writes the tests first.",
        price: 15.99,
    },
];

/// Look a product up by id
pub fn product(id: u32) -> Option<&'static Product> {
    CATALOGUE.iter().find(|p| p.id == id)
}

/// Check credentials the way the login form does, in this order:
/// missing username, missing password, unknown account or wrong password,
/// then locked account.
pub fn check_credentials(username: &str, password: &str) -> Result<(), String> {
    let message = if username.is_empty() {
        "Username is required"
    } else if password.is_empty() {
        "Password is required"
    } else if password != PASSWORD
        || !(ACCEPTED_USERS.contains(&username) || username == LOCKED_OUT_USER)
    {
        "Username and password do not match any user in this service"
    } else if username == LOCKED_OUT_USER {
        "Sorry, this user has been locked out."
    } else {
        return Ok(());
    };
    Err(format!("{ERROR_PREFIX}{message}"))
}

/// What a click on an element does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    DismissError,
    OpenMenu,
    CloseMenu,
    AllItems,
    Logout,
    ResetAppState,
    OpenItem(u32),
    AddToCart(u32),
    RemoveFromCart(u32),
    OpenCart,
    BackToProducts,
    ContinueShopping,
}

/// Screen currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Blank,
    Login,
    Inventory,
    Item(u32),
    Cart,
}

/// Observable state of the login flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Form shown, no error
    Unauthenticated,
    /// Form shown with an error banner
    Error(String),
    /// Logged in as this user
    Authenticated(String),
}

/// Outcome of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Screen(Screen),
    NotFound,
}

/// State of one simulated tab
#[derive(Debug, Clone)]
pub struct Session {
    origin: String,
    screen: Screen,
    user: Option<String>,
    error: Option<String>,
    fields: HashMap<String, String>,
    menu_open: bool,
    cart: Vec<u32>,
    pending: Option<(Instant, Screen)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            origin: String::new(),
            screen: Screen::Blank,
            user: None,
            error: None,
            fields: HashMap::new(),
            menu_open: false,
            cart: Vec::new(),
            pending: None,
        }
    }

    pub const fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map_or("", String::as_str)
    }

    pub const fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn cart(&self) -> &[u32] {
        &self.cart
    }

    pub fn in_cart(&self, id: u32) -> bool {
        self.cart.contains(&id)
    }

    pub fn login_state(&self) -> LoginState {
        match (&self.user, &self.error) {
            (Some(user), _) => LoginState::Authenticated(user.clone()),
            (None, Some(error)) => LoginState::Error(error.clone()),
            (None, None) => LoginState::Unauthenticated,
        }
    }

    /// Current absolute URL
    pub fn url(&self) -> String {
        let path = match self.screen {
            Screen::Blank => return "about:blank".to_string(),
            Screen::Login => "/".to_string(),
            Screen::Inventory => "/inventory.html".to_string(),
            Screen::Item(id) => format!("/inventory-item.html?id={id}"),
            Screen::Cart => "/cart.html".to_string(),
        };
        format!("{}{path}", self.origin)
    }

    /// Apply a transition that was deferred (slow login) once it is due
    pub fn settle(&mut self, now: Instant) {
        if let Some((due, screen)) = self.pending {
            if now >= due {
                self.pending = None;
                self.show(screen);
            }
        }
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.menu_open = false;
    }

    /// Navigate to an absolute URL
    pub fn goto(&mut self, url: &str) -> Route {
        if url == "about:blank" {
            self.show(Screen::Blank);
            return Route::Screen(Screen::Blank);
        }
        if let Some((scheme, rest)) = url.split_once("://") {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            self.origin = format!("{scheme}://{host}");
        }
        self.pending = None;
        let path = path_of(url);
        let query = url.split_once('?').map_or("", |(_, q)| q);
        let screen = match path {
            "/" | "" | "/index.html" => Screen::Login,
            "/inventory.html" => Screen::Inventory,
            "/cart.html" => Screen::Cart,
            "/inventory-item.html" => Screen::Item(
                query
                    .split('&')
                    .find_map(|kv| kv.strip_prefix("id="))
                    .and_then(|id| id.parse().ok())
                    .unwrap_or(u32::MAX),
            ),
            _ => return Route::NotFound,
        };
        if screen != Screen::Login && self.user.is_none() {
            self.error = Some(format!(
                "{ERROR_PREFIX}You can only access '{path}' when you are logged in."
            ));
            self.show(Screen::Login);
            return Route::Screen(Screen::Login);
        }
        if screen == Screen::Login {
            self.error = None;
        }
        self.show(screen);
        Route::Screen(screen)
    }

    /// Type into an input, keyed by its id
    pub fn fill(&mut self, key: &str, text: &str) {
        let _ = self.fields.insert(key.to_string(), text.to_string());
    }

    /// Apply the effect of a click
    pub fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Login => self.submit_login(now),
            Action::DismissError => self.error = None,
            Action::OpenMenu => self.menu_open = true,
            Action::CloseMenu => self.menu_open = false,
            Action::AllItems | Action::BackToProducts | Action::ContinueShopping => {
                self.show(Screen::Inventory);
            }
            Action::Logout => {
                self.user = None;
                self.error = None;
                self.fields.clear();
                self.show(Screen::Login);
            }
            Action::ResetAppState => self.cart.clear(),
            Action::OpenItem(id) => self.show(Screen::Item(id)),
            Action::AddToCart(id) => {
                if !self.in_cart(id) {
                    self.cart.push(id);
                }
            }
            Action::RemoveFromCart(id) => self.cart.retain(|c| *c != id),
            Action::OpenCart => self.show(Screen::Cart),
        }
    }

    fn submit_login(&mut self, now: Instant) {
        let username = self.field("user-name").to_string();
        let password = self.field("password").to_string();
        match check_credentials(&username, &password) {
            Ok(()) => {
                self.error = None;
                self.fields.clear();
                if username == "performance_glitch_user" {
                    self.pending = Some((now + GLITCH_DELAY, Screen::Inventory));
                } else {
                    self.show(Screen::Inventory);
                }
                self.user = Some(username);
            }
            Err(message) => self.error = Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.saucedemo.com";

    fn at_login() -> Session {
        let mut session = Session::new();
        let _ = session.goto(&format!("{ORIGIN}/"));
        session
    }

    fn submit(session: &mut Session, username: &str, password: &str) {
        session.fill("user-name", username);
        session.fill("password", password);
        session.apply(Action::Login, Instant::now());
    }

    mod credentials_tests {
        use super::*;

        #[test]
        fn test_error_precedence() {
            let msg = |u, p| check_credentials(u, p).unwrap_err();
            assert_eq!(msg("", ""), "Epic sadface: Username is required");
            assert_eq!(msg("", PASSWORD), "Epic sadface: Username is required");
            assert_eq!(msg(LOCKED_OUT_USER, ""), "Epic sadface: Password is required");
            assert_eq!(
                msg(LOCKED_OUT_USER, "nope"),
                "Epic sadface: Username and password do not match any user in this service"
            );
            assert_eq!(
                msg(LOCKED_OUT_USER, PASSWORD),
                "Epic sadface: Sorry, this user has been locked out."
            );
            assert_eq!(
                msg("wrong_username", PASSWORD),
                "Epic sadface: Username and password do not match any user in this service"
            );
        }

        #[test]
        fn test_accepted_users() {
            for user in ACCEPTED_USERS {
                assert!(check_credentials(user, PASSWORD).is_ok(), "{user}");
            }
        }

        #[test]
        fn test_catalogue() {
            let backpack = product(4).unwrap();
            assert_eq!(backpack.display_price(), "$29.99");
            assert_eq!(backpack.slug(), "sauce-labs-backpack");
            assert_eq!(CATALOGUE.len(), 6);
            assert!(product(99).is_none());
        }
    }

    mod login_state_tests {
        use super::*;

        #[test]
        fn test_error_then_success() {
            let mut session = at_login();
            assert_eq!(session.login_state(), LoginState::Unauthenticated);

            submit(&mut session, "standard_user", "wrong_password");
            assert!(matches!(session.login_state(), LoginState::Error(_)));
            assert_eq!(session.screen(), Screen::Login);

            submit(&mut session, "standard_user", PASSWORD);
            assert_eq!(
                session.login_state(),
                LoginState::Authenticated("standard_user".to_string())
            );
            assert_eq!(session.screen(), Screen::Inventory);
            assert_eq!(session.url(), format!("{ORIGIN}/inventory.html"));
        }

        #[test]
        fn test_logout_returns_to_unauthenticated() {
            let mut session = at_login();
            submit(&mut session, "problem_user", PASSWORD);
            session.apply(Action::OpenMenu, Instant::now());
            assert!(session.menu_open());
            session.apply(Action::Logout, Instant::now());
            assert_eq!(session.login_state(), LoginState::Unauthenticated);
            assert_eq!(session.screen(), Screen::Login);
            assert!(!session.menu_open());
        }

        #[test]
        fn test_glitch_user_lands_after_delay() {
            let mut session = at_login();
            let now = Instant::now();
            session.fill("user-name", "performance_glitch_user");
            session.fill("password", PASSWORD);
            session.apply(Action::Login, now);
            assert_eq!(session.screen(), Screen::Login);
            session.settle(now + GLITCH_DELAY);
            assert_eq!(session.screen(), Screen::Inventory);
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_protected_pages_need_login() {
            let mut session = Session::new();
            let route = session.goto(&format!("{ORIGIN}/cart.html"));
            assert_eq!(route, Route::Screen(Screen::Login));
            assert_eq!(
                session.error(),
                Some("Epic sadface: You can only access '/cart.html' when you are logged in.")
            );
        }

        #[test]
        fn test_item_and_unknown_paths() {
            let mut session = at_login();
            submit(&mut session, "standard_user", PASSWORD);
            assert_eq!(
                session.goto(&format!("{ORIGIN}/inventory-item.html?id=4")),
                Route::Screen(Screen::Item(4))
            );
            assert_eq!(session.url(), format!("{ORIGIN}/inventory-item.html?id=4"));
            assert_eq!(session.goto(&format!("{ORIGIN}/nowhere")), Route::NotFound);
        }

        #[test]
        fn test_cart_add_is_idempotent() {
            let mut session = at_login();
            submit(&mut session, "standard_user", PASSWORD);
            session.apply(Action::AddToCart(4), Instant::now());
            session.apply(Action::AddToCart(4), Instant::now());
            session.apply(Action::AddToCart(0), Instant::now());
            assert_eq!(session.cart(), &[4, 0]);
            session.apply(Action::RemoveFromCart(4), Instant::now());
            assert_eq!(session.cart(), &[0]);
            session.apply(Action::ResetAppState, Instant::now());
            assert!(session.cart().is_empty());
        }
    }
}
