//! Argument capture: typed call signatures flattened into positional values.

use crate::capture::{capture, tagged};
use serde::Serialize;
use serde_json::Value;

/// Key of the marker object recorded for a value whose `Serialize` impl fails.
pub const UNSERIALIZABLE_TAG: &str = "$unserializable";

/// Converts one argument into its recorded form.
///
/// A value whose serialization fails is recorded as
/// `{"$unserializable": "<error>"}` so that recording itself never fails.
/// Equality matchers reject that marker on either side.
pub fn to_argument<T: Serialize + ?Sized>(value: &T) -> Value {
    capture(value).unwrap_or_else(|e| tagged(UNSERIALIZABLE_TAG, e.to_string()))
}

pub fn is_unserializable(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.len() == 1 && map.contains_key(UNSERIALIZABLE_TAG))
}

/// A call signature whose arguments can be captured positionally.
///
/// Implemented for `()` and for tuples of up to six `Serialize` elements.
pub trait Arguments {
    fn to_arguments(&self) -> Vec<Value>;
}

impl Arguments for () {
    fn to_arguments(&self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_arguments_for_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Serialize),+> Arguments for ($($name,)+) {
            fn to_arguments(&self) -> Vec<Value> {
                vec![$(to_argument(&self.$idx)),+]
            }
        }
    };
}

impl_arguments_for_tuple!(A: 0);
impl_arguments_for_tuple!(A: 0, B: 1);
impl_arguments_for_tuple!(A: 0, B: 1, C: 2);
impl_arguments_for_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_arguments_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_arguments_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// One captured call. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    index: usize,
    arguments: Vec<Value>,
}

impl Invocation {
    pub(crate) fn new(index: usize, arguments: Vec<Value>) -> Self {
        Self { index, arguments }
    }

    /// Position of this call in the recorder's log.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}
