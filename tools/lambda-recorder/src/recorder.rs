//! The recorder itself: a callable stand-in that logs every call.

use crate::arguments::{Arguments, Invocation};
use crate::assertions::{CalledOnceAssertions, LambdaRecorderAssertions, ParametersAssertions};
use crate::config::global_config;
use crate::errors::AssertionFailure;
use crate::logging::render_value;
use crate::trace::{trace_assertion, trace_invocation};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

const DEFAULT_LABEL: &str = "lambda";

struct RecorderState {
    label: String,
    invocations: Mutex<Vec<Invocation>>,
}

impl RecorderState {
    fn append(&self, arguments: Vec<Value>) {
        let mut log = self
            .invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let index = log.len();
        // Traced while the log is held so trace lines follow index order.
        trace_invocation(&self.label, Some(index), &arguments, false);
        log.push(Invocation::new(index, arguments));
    }

    fn snapshot(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Stand-in for a function-typed dependency with signature `Fn(A) -> R`.
///
/// Every [`invoke`](Self::invoke) appends the call's arguments to a log and
/// then runs the block given at construction. Clones share the same log, so
/// one clone can be handed to the code under test while the test keeps
/// another for assertions.
///
/// ```ignore
/// let filter =
///     LambdaRecorder::new(|(_query, _batch): (Option<String>, u32)| Ok::<(), String>(()));
/// let list = FakeRoomDirectoryList { filter: filter.clone(), .. };
/// list.filter(Some("matrix".into()), 20);
/// filter
///     .assert_called_once()
///     .with_arguments(vec![value("matrix"), value(20)]);
/// ```
pub struct LambdaRecorder<A, R = ()> {
    state: Arc<RecorderState>,
    /// `None` for a recorder that must never be invoked.
    block: Option<Arc<dyn Fn(A) -> R + Send + Sync>>,
}

impl<A, R> Clone for LambdaRecorder<A, R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            block: self.block.clone(),
        }
    }
}

impl<A, R> std::fmt::Debug for LambdaRecorder<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaRecorder")
            .field("label", &self.state.label)
            .field("ensure_never_called", &self.block.is_none())
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl<A, R> LambdaRecorder<A, R> {
    pub fn new<F>(block: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::named(DEFAULT_LABEL, block)
    }

    /// Like [`new`](Self::new), with `label` shown in failures and trace events.
    pub fn named<F>(label: impl Into<String>, block: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let block: Arc<dyn Fn(A) -> R + Send + Sync> = Arc::new(block);
        Self::build(label, Some(block))
    }

    /// A recorder whose invocation is itself a test failure.
    pub fn never_called() -> Self {
        Self::never_called_named(DEFAULT_LABEL)
    }

    pub fn never_called_named(label: impl Into<String>) -> Self {
        Self::build(label, None)
    }

    fn build(label: impl Into<String>, block: Option<Arc<dyn Fn(A) -> R + Send + Sync>>) -> Self {
        // Installs the trace sink from the config file, if one is configured.
        global_config();
        Self {
            state: Arc::new(RecorderState {
                label: label.into(),
                invocations: Mutex::new(Vec::new()),
            }),
            block,
        }
    }

    pub fn label(&self) -> &str {
        &self.state.label
    }

    /// Appends one invocation with the given positional arguments.
    ///
    /// Does not run the block and never fails, even on a
    /// [`never_called`](Self::never_called) recorder.
    pub fn record(&self, arguments: Vec<Value>) {
        self.state.append(arguments);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.snapshot()
    }

    pub fn call_count(&self) -> usize {
        self.state
            .invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of the log, entry point of the fluent assertion API.
    pub fn assertions(&self) -> LambdaRecorderAssertions {
        LambdaRecorderAssertions::new(
            self.state.label.clone(),
            self.state.snapshot(),
            global_config().assertions.max_rendered_value_bytes,
        )
    }

    #[track_caller]
    pub fn assert_called_exactly(&self, times: usize) -> ParametersAssertions {
        self.assertions().assert_called_exactly(times)
    }

    #[track_caller]
    pub fn assert_called_once(&self) -> CalledOnceAssertions {
        self.assertions().assert_called_once()
    }

    #[track_caller]
    pub fn assert_called_never(&self) {
        self.assertions().assert_called_never()
    }
}

impl<A: Arguments, R> LambdaRecorder<A, R> {
    /// Records the call, then returns whatever the block returns.
    #[track_caller]
    pub fn invoke(&self, args: A) -> R {
        let arguments = args.to_arguments();
        let Some(block) = &self.block else {
            trace_invocation(&self.state.label, None, &arguments, true);
            let failure = AssertionFailure::UnexpectedInvocation {
                arguments: render_value(
                    &Value::Array(arguments),
                    global_config().assertions.max_rendered_value_bytes,
                ),
            };
            trace_assertion(
                &self.state.label,
                "never_called",
                Some((failure.kind(), failure.to_string())),
            );
            panic!("{}: {failure}", self.state.label);
        };
        self.state.append(arguments);
        block(args)
    }
}

impl<A, R> LambdaRecorder<A, R>
where
    A: Arguments + 'static,
    R: 'static,
{
    /// A closure sharing this recorder's log, for fields typed as functions.
    pub fn as_fn(&self) -> impl Fn(A) -> R + Send + Sync + 'static {
        let recorder = self.clone();
        move |args| recorder.invoke(args)
    }

    pub fn boxed(&self) -> Box<dyn Fn(A) -> R + Send + Sync> {
        Box::new(self.as_fn())
    }
}
