//! Data-driven test generation.
//!
//! A literal table of rows becomes one [`TestCase`] per row when the suite is
//! built, each named from its row and reported on its own.
//!
//! ```ignore
//! suite.add_tests(parameterize(
//!     VALID_USERS.iter().copied(),
//!     &["login_page", "home_page"],
//!     |u| format!("can log in {u}"),
//!     can_log_in,
//! ));
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::fixture::TestContext;
use crate::harness::TestCase;
use crate::result::ShopcheckResult;

/// One test per row; the body receives its own copy of the row
pub fn parameterize<R, I, N, F, Fut>(rows: I, uses: &[&str], name: N, body: F) -> Vec<TestCase>
where
    I: IntoIterator<Item = R>,
    R: Clone + Send + Sync + 'static,
    N: Fn(&R) -> String,
    F: Fn(R, TestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ShopcheckResult<()>> + Send + 'static,
{
    let body = Arc::new(body);
    rows.into_iter()
        .map(|row| {
            let body = Arc::clone(&body);
            let title = name(&row);
            TestCase::new(title, uses, move |ctx| body(row.clone(), ctx))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixture::FixtureSet;
    use crate::harness::{TestHarness, TestStatus, TestSuite};
    use crate::result::ShopcheckError;

    #[test]
    fn test_one_case_per_row_in_order() {
        let cases = parameterize(
            ["standard_user", "problem_user"],
            &["login_page"],
            |u| format!("can log in {u}"),
            |_u, _ctx| async { Ok(()) },
        );
        let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["can log in standard_user", "can log in problem_user"]);
        assert!(cases.iter().all(|c| c.uses == vec!["login_page".to_string()]));
    }

    #[test]
    fn test_empty_table() {
        let cases = parameterize(
            Vec::<u8>::new(),
            &[],
            ToString::to_string,
            |_n, _ctx| async { Ok(()) },
        );
        assert!(cases.is_empty());
    }

    #[tokio::test]
    async fn test_rows_are_reported_independently() {
        let mut suite = TestSuite::new("table", FixtureSet::new("none"));
        suite.add_tests(parameterize(
            [1_u32, 2, 3],
            &[],
            |n| format!("row {n}"),
            |n, _ctx| async move {
                if n == 2 {
                    Err(ShopcheckError::page("row 2 fails"))
                } else {
                    Ok(())
                }
            },
        ));
        let results = TestHarness::new().run(&suite).await.unwrap();
        assert_eq!(results.get("row 1").unwrap().status, TestStatus::Passed);
        assert_eq!(results.get("row 2").unwrap().status, TestStatus::Failed);
        assert_eq!(results.get("row 3").unwrap().status, TestStatus::Passed);
    }
}
