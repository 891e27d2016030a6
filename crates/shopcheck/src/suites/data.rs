//! Literal login tables.

use serde::{Deserialize, Serialize};

/// Password shared by every demo account
pub const PASSWORD: &str = "secret_sauce";

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("standard_user", PASSWORD)
    }
}

/// Accounts that reach the inventory with [`PASSWORD`]
pub const VALID_USERS: &[&str] = &["standard_user", "problem_user", "performance_glitch_user"];

/// A submission the storefront rejects, with the error it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLogin {
    pub username: &'static str,
    pub password: &'static str,
    pub error: &'static str,
}

pub const INVALID_LOGINS: &[InvalidLogin] = &[
    InvalidLogin {
        username: "locked_out_user",
        password: PASSWORD,
        error: "Sorry, this user has been locked out.",
    },
    InvalidLogin {
        username: "",
        password: PASSWORD,
        error: "Username is required",
    },
    InvalidLogin {
        username: "locked_out_user",
        password: "",
        error: "Password is required",
    },
    InvalidLogin {
        username: "wrong_username",
        password: PASSWORD,
        error: "Username and password do not match any user in this service",
    },
    InvalidLogin {
        username: "standard_user",
        password: "wrong_password",
        error: "Username and password do not match any user in this service",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_site::store::check_credentials;

    #[test]
    fn test_tables_agree_with_storefront_rules() {
        for user in VALID_USERS {
            assert!(check_credentials(user, PASSWORD).is_ok(), "{user}");
        }
        for row in INVALID_LOGINS {
            let message = check_credentials(row.username, row.password).unwrap_err();
            assert!(message.ends_with(row.error), "{message} / {}", row.error);
        }
    }

    #[test]
    fn test_default_credentials() {
        let creds = Credentials::default();
        assert_eq!(creds.username, "standard_user");
        assert_eq!(creds.password, "secret_sauce");
    }
}
