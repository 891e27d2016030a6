//! Command handlers - extracted from main.rs for testability

pub mod list;
pub mod run;

pub use list::{execute_list, list_tests, render_text, SuiteListing};
pub use run::execute_run;
