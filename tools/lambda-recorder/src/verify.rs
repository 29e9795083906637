//! Non-panicking checks over a snapshot of recorded invocations.
//!
//! Checks run in a fixed order (count, then per-invocation arity, then
//! per-argument matchers, left to right and top to bottom) and stop at the
//! first failure.

use crate::arguments::Invocation;
use crate::errors::AssertionFailure;
use crate::logging::{render_value, truncate_text};
use crate::matcher::Matcher;

pub fn verify_call_count(
    invocations: &[Invocation],
    expected: usize,
) -> Result<(), AssertionFailure> {
    if invocations.len() != expected {
        return Err(AssertionFailure::CountMismatch {
            expected,
            actual: invocations.len(),
        });
    }
    Ok(())
}

/// Matches each invocation against the matcher list at the same position.
///
/// `max_rendered_bytes` bounds the `actual`/`expected` text in a
/// [`AssertionFailure::ValueMismatch`].
pub fn verify_sequence(
    invocations: &[Invocation],
    expected: &[Vec<Matcher>],
    max_rendered_bytes: usize,
) -> Result<(), AssertionFailure> {
    verify_call_count(invocations, expected.len())?;
    for (invocation, matchers) in invocations.iter().zip(expected) {
        if invocation.arity() != matchers.len() {
            return Err(AssertionFailure::ArityMismatch {
                invocation: invocation.index(),
                expected: matchers.len(),
                actual: invocation.arity(),
            });
        }
        let pairs = invocation.arguments().iter().zip(matchers);
        for (parameter, (actual, matcher)) in pairs.enumerate() {
            if !matcher.matches(actual) {
                return Err(AssertionFailure::ValueMismatch {
                    invocation: invocation.index(),
                    parameter,
                    actual: render_value(actual, max_rendered_bytes),
                    expected: truncate_text(matcher.describe(), max_rendered_bytes),
                });
            }
        }
    }
    Ok(())
}

/// Fails on the first invocation that carried any argument.
pub fn verify_no_arguments(invocations: &[Invocation]) -> Result<(), AssertionFailure> {
    match invocations.iter().find(|invocation| invocation.arity() > 0) {
        Some(invocation) => Err(AssertionFailure::ArityMismatch {
            invocation: invocation.index(),
            expected: 0,
            actual: invocation.arity(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{verify_call_count, verify_no_arguments, verify_sequence};
    use crate::arguments::Invocation;
    use crate::errors::AssertionFailure;
    use crate::matcher::{any, value};
    use serde_json::json;

    fn log(calls: Vec<Vec<serde_json::Value>>) -> Vec<Invocation> {
        calls
            .into_iter()
            .enumerate()
            .map(|(index, args)| Invocation::new(index, args))
            .collect()
    }

    #[test]
    fn count_is_checked_before_anything_else() {
        let invocations = log(vec![vec![json!(1)]]);
        let err = verify_sequence(&invocations, &[vec![value(1)], vec![value(2)]], 64)
            .expect_err("two expected, one recorded");
        assert_eq!(
            err,
            AssertionFailure::CountMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert!(verify_call_count(&invocations, 1).is_ok());
    }

    #[test]
    fn first_value_mismatch_wins() {
        let invocations = log(vec![
            vec![json!("x"), json!(1)],
            vec![json!("y"), json!(2)],
            vec![json!("w"), json!(3)],
        ]);
        let err = verify_sequence(
            &invocations,
            &[
                vec![value("x"), value(1)],
                vec![value("z"), value(9)],
                vec![value("q"), any()],
            ],
            64,
        )
        .expect_err("mismatch");
        assert_eq!(
            err,
            AssertionFailure::ValueMismatch {
                invocation: 1,
                parameter: 0,
                actual: "\"y\"".to_string(),
                expected: "\"z\"".to_string(),
            }
        );
    }

    #[test]
    fn no_arguments_reports_offending_invocation() {
        let invocations = log(vec![vec![], vec![json!(true), json!(false)]]);
        assert_eq!(
            verify_no_arguments(&invocations),
            Err(AssertionFailure::ArityMismatch {
                invocation: 1,
                expected: 0,
                actual: 2
            })
        );
        assert!(verify_no_arguments(&log(vec![vec![], vec![]])).is_ok());
        assert!(verify_no_arguments(&[]).is_ok());
    }

    #[test]
    fn long_values_are_truncated_in_failures() {
        let invocations = log(vec![vec![json!("a".repeat(500))]]);
        let err = verify_sequence(&invocations, &[vec![value("b".repeat(500))]], 32)
            .expect_err("mismatch");
        match err {
            AssertionFailure::ValueMismatch { actual, expected, .. } => {
                assert!(actual.len() <= 32 && actual.ends_with("..."));
                assert!(expected.len() <= 32 && expected.ends_with("..."));
            }
            other => panic!("unexpected failure {other:?}"),
        }
    }
}
