//! List command handler

use serde::Serialize;
use shopcheck::{Browser, RunConfig, TestHarness, TestSuite};

use crate::commands::ListArgs;
use crate::error::CliResult;
use crate::runner::select_suites;

/// One suite as listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteListing {
    /// Suite name
    pub suite: String,
    /// Tests passing the filter, in run order
    pub tests: Vec<String>,
}

/// Suites and test names after applying the suite and name filters
pub fn list_tests(suites: Vec<TestSuite>, args: &ListArgs) -> CliResult<Vec<SuiteListing>> {
    let harness = args
        .filter
        .as_ref()
        .map_or_else(TestHarness::new, |f| TestHarness::new().with_filter(f));
    Ok(select_suites(suites, args.suite.as_deref())?
        .iter()
        .map(|suite| SuiteListing {
            suite: suite.name.clone(),
            tests: suite
                .test_names()
                .into_iter()
                .filter(|n| harness.selects(n))
                .map(ToString::to_string)
                .collect(),
        })
        .collect())
}

/// Render listings as indented text
#[must_use]
pub fn render_text(listings: &[SuiteListing]) -> String {
    let mut out = String::new();
    for listing in listings {
        out.push_str(&listing.suite);
        out.push_str(&format!(" ({} tests)\n", listing.tests.len()));
        for test in &listing.tests {
            out.push_str("  ");
            out.push_str(test);
            out.push('\n');
        }
    }
    out
}

/// Execute the list command
pub fn execute_list(config: &RunConfig, args: &ListArgs) -> CliResult<()> {
    // listing builds the suites but never opens a page
    let browser = Browser::simulated(config.base_url.clone());
    let listings = list_tests(shopcheck::suites::all_suites(&browser), args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        print!("{}", render_text(&listings));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(filter: Option<&str>, suite: Option<&str>) -> ListArgs {
        ListArgs {
            filter: filter.map(ToString::to_string),
            suite: suite.map(ToString::to_string),
            json: false,
        }
    }

    fn suites() -> Vec<TestSuite> {
        shopcheck::suites::all_suites(&Browser::simulated(shopcheck::DEFAULT_BASE_URL))
    }

    #[test]
    fn test_list_everything() {
        let listings = list_tests(suites(), &args(None, None)).unwrap();
        assert_eq!(listings.len(), 2);
        assert!(listings[0].tests.contains(&"can log in standard_user".to_string()));
    }

    #[test]
    fn test_filter_and_suite() {
        let listings = list_tests(suites(), &args(Some("can log in"), Some("login"))).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].tests.len(), 3);
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&[SuiteListing {
            suite: "cart".to_string(),
            tests: vec!["a".to_string(), "b".to_string()],
        }]);
        assert_eq!(text, "cart (2 tests)\n  a\n  b\n");
    }
}
