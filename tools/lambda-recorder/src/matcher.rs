//! Per-argument predicates used by the assertion API.

use crate::arguments::{is_unserializable, to_argument};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub trait ParameterMatcher: Send + Sync {
    fn matches(&self, actual: &Value) -> bool;

    /// Text shown as `expected=` when the match fails.
    fn describe(&self) -> String;
}

pub type Matcher = Box<dyn ParameterMatcher>;

impl fmt::Debug for dyn ParameterMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

struct EqualsMatcher {
    expected: Value,
}

impl ParameterMatcher for EqualsMatcher {
    fn matches(&self, actual: &Value) -> bool {
        // A failed serialization says nothing about the value; never equal.
        if is_unserializable(actual) || is_unserializable(&self.expected) {
            return false;
        }
        *actual == self.expected
    }

    fn describe(&self) -> String {
        self.expected.to_string()
    }
}

struct AnyMatcher;

impl ParameterMatcher for AnyMatcher {
    fn matches(&self, _actual: &Value) -> bool {
        true
    }

    fn describe(&self) -> String {
        "any()".to_string()
    }
}

struct PredicateMatcher<F> {
    description: String,
    predicate: F,
}

impl<F> ParameterMatcher for PredicateMatcher<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, actual: &Value) -> bool {
        (self.predicate)(actual)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Matches an argument equal to the serialized form of `expected`.
pub fn value<T: Serialize>(expected: T) -> Matcher {
    Box::new(EqualsMatcher {
        expected: to_argument(&expected),
    })
}

pub fn any() -> Matcher {
    Box::new(AnyMatcher)
}

pub fn matching<F>(description: impl Into<String>, predicate: F) -> Matcher
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Box::new(PredicateMatcher {
        description: description.into(),
        predicate,
    })
}

#[cfg(test)]
mod tests {
    use super::{any, matching, value};
    use crate::arguments::to_argument;
    use serde::{Serialize, Serializer};
    use serde_json::json;
    use std::collections::HashMap;

    struct Refuses;

    impl Serialize for Refuses {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not serializable"))
        }
    }

    #[test]
    fn value_compares_serialized_forms() {
        assert!(value("x").matches(&json!("x")));
        assert!(!value("x").matches(&json!("y")));
        assert!(value(Some(3_u8)).matches(&json!(3)));
        assert!(value(None::<String>).matches(&json!(null)));
        assert_eq!(value("z").describe(), "\"z\"");
    }

    #[test]
    fn value_keeps_nan_infinity_and_none_apart() {
        let recorded_nan = to_argument(&f64::NAN);
        assert!(!value(f64::INFINITY).matches(&recorded_nan));
        assert!(!value(f64::NEG_INFINITY).matches(&recorded_nan));
        assert!(!value(None::<u8>).matches(&recorded_nan));
        assert!(value(f64::NAN).matches(&recorded_nan));
        assert_eq!(value(f32::INFINITY).describe(), r#"{"$float":"inf"}"#);
    }

    #[test]
    fn maps_with_different_tuple_keys_do_not_match() {
        let recorded = to_argument(&HashMap::from([((1, 2), 1)]));
        assert!(!value(HashMap::from([((9, 9), 200)])).matches(&recorded));
        assert!(value(HashMap::from([((1, 2), 1)])).matches(&recorded));
    }

    #[test]
    fn unserializable_values_never_match() {
        let marker = to_argument(&Refuses);
        assert!(!value(Refuses).matches(&marker));
        assert!(!value(Refuses).matches(&json!(null)));
        assert!(!value("x").matches(&marker));
        assert!(any().matches(&marker));
    }

    #[test]
    fn any_accepts_everything() {
        let matcher = any();
        assert!(matcher.matches(&json!(null)));
        assert!(matcher.matches(&json!({"k": [1, 2]})));
        assert_eq!(matcher.describe(), "any()");
    }

    #[test]
    fn matching_uses_predicate_and_description() {
        let positive = matching("a positive number", |v| v.as_i64().is_some_and(|n| n > 0));
        assert!(positive.matches(&json!(4)));
        assert!(!positive.matches(&json!(-4)));
        assert!(!positive.matches(&json!("4")));
        assert_eq!(format!("{positive:?}"), "a positive number");
    }
}
