//! Fluent, panicking assertions over a recorder snapshot.
//!
//! Every method here is `#[track_caller]`: a failed expectation panics with
//! the recorder label and the [`AssertionFailure`] text, and the test harness
//! reports the line of the test that made the assertion.

use crate::arguments::Invocation;
use crate::errors::AssertionFailure;
use crate::matcher::Matcher;
use crate::trace::trace_assertion;
use crate::verify::{verify_call_count, verify_no_arguments, verify_sequence};

#[track_caller]
fn settle(label: &str, check: &str, outcome: Result<(), AssertionFailure>) {
    match outcome {
        Ok(()) => trace_assertion(label, check, None),
        Err(failure) => {
            trace_assertion(label, check, Some((failure.kind(), failure.to_string())));
            panic!("{label}: {failure}");
        }
    }
}

#[derive(Debug, Clone)]
pub struct LambdaRecorderAssertions {
    label: String,
    invocations: Vec<Invocation>,
    max_rendered_bytes: usize,
}

impl LambdaRecorderAssertions {
    pub(crate) fn new(
        label: String,
        invocations: Vec<Invocation>,
        max_rendered_bytes: usize,
    ) -> Self {
        Self {
            label,
            invocations,
            max_rendered_bytes,
        }
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    #[track_caller]
    pub fn assert_called_once(&self) -> CalledOnceAssertions {
        CalledOnceAssertions {
            inner: self.assert_called_exactly(1),
        }
    }

    #[track_caller]
    pub fn assert_called_never(&self) {
        settle(
            &self.label,
            "called_never",
            verify_call_count(&self.invocations, 0),
        );
    }

    #[track_caller]
    pub fn assert_called_exactly(&self, times: usize) -> ParametersAssertions {
        settle(
            &self.label,
            "called_exactly",
            verify_call_count(&self.invocations, times),
        );
        ParametersAssertions {
            label: self.label.clone(),
            invocations: self.invocations.clone(),
            max_rendered_bytes: self.max_rendered_bytes,
        }
    }
}

/// Per-call assertions after a successful count check.
#[derive(Debug, Clone)]
pub struct ParametersAssertions {
    label: String,
    invocations: Vec<Invocation>,
    max_rendered_bytes: usize,
}

impl ParametersAssertions {
    /// One matcher list per recorded invocation, in call order.
    #[track_caller]
    pub fn assert_sequence(&self, matchers_sequence: Vec<Vec<Matcher>>) {
        settle(
            &self.label,
            "sequence",
            verify_sequence(&self.invocations, &matchers_sequence, self.max_rendered_bytes),
        );
    }

    #[track_caller]
    pub fn assert_no_arguments_for_all(&self) {
        settle(
            &self.label,
            "no_arguments",
            verify_no_arguments(&self.invocations),
        );
    }
}

/// Assertions on the single call left by `assert_called_once`.
#[derive(Debug, Clone)]
pub struct CalledOnceAssertions {
    inner: ParametersAssertions,
}

impl CalledOnceAssertions {
    #[track_caller]
    pub fn with_arguments(&self, matchers: Vec<Matcher>) {
        self.inner.assert_sequence(vec![matchers]);
    }

    #[track_caller]
    pub fn with_no_arguments(&self) {
        self.inner.assert_no_arguments_for_all();
    }
}

#[cfg(test)]
mod tests {
    use super::LambdaRecorderAssertions;
    use crate::arguments::Invocation;
    use crate::matcher::{any, value};
    use serde_json::json;

    fn snapshot(calls: Vec<Vec<serde_json::Value>>) -> LambdaRecorderAssertions {
        let invocations = calls
            .into_iter()
            .enumerate()
            .map(|(index, args)| Invocation::new(index, args))
            .collect();
        LambdaRecorderAssertions::new("filter".to_string(), invocations, 64)
    }

    #[test]
    fn empty_log_is_never_called() {
        let assertions = snapshot(vec![]);
        assertions.assert_called_never();
        assertions.assert_called_exactly(0).assert_no_arguments_for_all();
    }

    #[test]
    #[should_panic(expected = "filter: Expected to be called 1 times, but was called 0 times")]
    fn empty_log_is_not_called_once() {
        snapshot(vec![]).assert_called_once();
    }

    #[test]
    fn called_once_with_matching_arguments() {
        let assertions = snapshot(vec![vec![json!(null), json!(20)]]);
        assertions
            .assert_called_once()
            .with_arguments(vec![value(None::<String>), value(20)]);
        assertions
            .assert_called_once()
            .with_arguments(vec![any(), any()]);
    }

    #[test]
    #[should_panic(expected = "Parameter #1 does not match the expected value (actual=20,expected=50) during invocation #0")]
    fn called_once_reports_failing_parameter() {
        snapshot(vec![vec![json!(null), json!(20)]])
            .assert_called_once()
            .with_arguments(vec![any(), value(50)]);
    }

    #[test]
    #[should_panic(expected = "Expected 0 parameters, but got 1 parameters during invocation #0")]
    fn with_no_arguments_rejects_argument_call() {
        snapshot(vec![vec![json!("x")]])
            .assert_called_once()
            .with_no_arguments();
    }
}
