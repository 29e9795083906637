//! Recording stand-ins for function-typed dependencies.
//!
//! A [`LambdaRecorder`] replaces a callback or function field of a fake
//! collaborator. It logs the arguments of every call in order, and the test
//! then checks the interaction with the fluent assertions:
//!
//! - `assert_called_never()`
//! - `assert_called_once().with_arguments(vec![value("x"), any()])`
//! - `assert_called_once().with_no_arguments()`
//! - `assert_called_exactly(n).assert_sequence(vec![...])`
//! - `assert_called_exactly(n).assert_no_arguments_for_all()`
//!
//! Checks stop at the first mismatch: call count, then the arity of each
//! call, then each argument left to right. A failed check panics with an
//! [`AssertionFailure`] message. The [`verify`] functions give the same
//! checks as `Result`s.
//!
//! Optional tracing of every call and assertion to a JSONL file is configured
//! through the TOML file named by [`config::CONFIG_ENV_VAR`].

pub mod arguments;
pub mod assertions;
mod capture;
pub mod config;
pub mod errors;
pub mod logging;
pub mod matcher;
pub mod recorder;
pub mod trace;
pub mod verify;

pub use arguments::{is_unserializable, Arguments, Invocation};
pub use assertions::{CalledOnceAssertions, LambdaRecorderAssertions, ParametersAssertions};
pub use errors::{AssertionFailure, RecorderError};
pub use matcher::{any, matching, value, Matcher, ParameterMatcher};
pub use recorder::LambdaRecorder;
