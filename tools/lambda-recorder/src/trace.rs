//! Process-global trace of recorder activity.
//!
//! When a sink is installed (explicitly, or through `trace.path` in the
//! config file) every invocation and every assertion outcome is appended to a
//! JSONL file as a [`LogEvent`] whose payload is a tagged [`TraceEntry`].
//! Without a sink, emission is a no-op.

use crate::config::TraceConfig;
use crate::errors::RecorderError;
use crate::logging::{truncate_json, LogEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static TRACE_SEQ: AtomicU64 = AtomicU64::new(1);

pub fn next_seq() -> u64 {
    TRACE_SEQ.fetch_add(1, Ordering::Relaxed)
}

pub fn timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEntry {
    Invocation(InvocationTrace),
    UnexpectedInvocation(InvocationTrace),
    Assertion(AssertionTrace),
}

impl TraceEntry {
    fn level(&self) -> &'static str {
        match self {
            Self::Invocation(_) => "info",
            Self::UnexpectedInvocation(_) => "error",
            Self::Assertion(a) if a.passed => "info",
            Self::Assertion(_) => "error",
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            Self::Invocation(_) => "invocation",
            Self::UnexpectedInvocation(_) => "unexpected_invocation",
            Self::Assertion(_) => "assertion",
        }
    }

    fn set_seq(&mut self, seq: u64) {
        match self {
            Self::Invocation(record) | Self::UnexpectedInvocation(record) => record.seq = seq,
            Self::Assertion(record) => record.seq = seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationTrace {
    pub seq: u64,
    pub timestamp_ns: u64,
    pub recorder: String,
    /// Position in the recorder's log; absent for rejected invocations.
    pub index: Option<usize>,
    pub thread_id: String,
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionTrace {
    pub seq: u64,
    pub timestamp_ns: u64,
    pub recorder: String,
    /// e.g. `"called_exactly"`, `"sequence"`, `"no_arguments"`
    pub check: String,
    pub passed: bool,
    pub failure_kind: Option<String>,
    pub message: Option<String>,
}

struct TraceSink {
    path: PathBuf,
    max_payload_bytes: usize,
    hash_arguments_over_bytes: usize,
    write_lock: Mutex<()>,
}

impl TraceSink {
    /// Stamps `entry` with the next sequence number and appends it as one line.
    ///
    /// The number is taken under the write lock, so `seq` grows with line order.
    fn emit(&self, mut entry: TraceEntry) -> Result<(), RecorderError> {
        let _guard = self.write_lock.lock().expect("trace write lock");
        entry.set_seq(next_seq());
        let payload =
            serde_json::to_value(&entry).map_err(|e| RecorderError::Io(e.to_string()))?;
        let line = serde_json::to_string(&LogEvent {
            level: entry.level(),
            event_type: entry.event_type(),
            payload: truncate_json(payload, self.max_payload_bytes),
        })
        .map_err(|e| RecorderError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RecorderError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| RecorderError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| RecorderError::Io(e.to_string()))
    }
}

static TRACE_SINK: OnceLock<Mutex<Option<Arc<TraceSink>>>> = OnceLock::new();

fn sink_slot() -> &'static Mutex<Option<Arc<TraceSink>>> {
    TRACE_SINK.get_or_init(|| Mutex::new(None))
}

fn current_sink() -> Option<Arc<TraceSink>> {
    sink_slot().lock().expect("trace sink lock").as_ref().map(Arc::clone)
}

/// Install the global trace sink, appending to `path`.
pub fn init_trace_sink(path: impl AsRef<Path>, cfg: &TraceConfig) -> Result<(), RecorderError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RecorderError::Io(e.to_string()))?;
    }
    let sink = Arc::new(TraceSink {
        path,
        max_payload_bytes: cfg.max_payload_bytes,
        hash_arguments_over_bytes: cfg.hash_arguments_over_bytes,
        write_lock: Mutex::new(()),
    });
    *sink_slot().lock().expect("trace sink init lock") = Some(sink);
    Ok(())
}

/// Remove the global trace sink and reset the sequence counter.
pub fn clear_trace_sink() {
    *sink_slot().lock().expect("trace sink clear lock") = None;
    TRACE_SEQ.store(1, Ordering::Relaxed);
}

pub fn tracing_enabled() -> bool {
    sink_slot().lock().expect("trace sink lock").is_some()
}

/// Append an entry to the trace, if a sink is installed.
///
/// The entry's `seq` is overwritten with the next sequence number. Write
/// errors are dropped: tracing never changes a test's outcome.
pub fn emit_trace(entry: TraceEntry) {
    if let Some(sink) = current_sink() {
        let _ = sink.emit(entry);
    }
}

pub(crate) fn trace_invocation(
    recorder: &str,
    index: Option<usize>,
    arguments: &[Value],
    rejected: bool,
) {
    let Some(sink) = current_sink() else {
        return;
    };
    let record = InvocationTrace {
        seq: 0,
        timestamp_ns: timestamp_ns(),
        recorder: recorder.to_string(),
        index,
        thread_id: format!("{:?}", std::thread::current().id()),
        arguments: arguments
            .iter()
            .map(|value| compact_argument(value, sink.hash_arguments_over_bytes))
            .collect(),
    };
    let entry = if rejected {
        TraceEntry::UnexpectedInvocation(record)
    } else {
        TraceEntry::Invocation(record)
    };
    let _ = sink.emit(entry);
}

pub(crate) fn trace_assertion(recorder: &str, check: &str, failure: Option<(&str, String)>) {
    if !tracing_enabled() {
        return;
    }
    let (failure_kind, message) = match failure {
        Some((kind, message)) => (Some(kind.to_string()), Some(message)),
        None => (None, None),
    };
    emit_trace(TraceEntry::Assertion(AssertionTrace {
        seq: 0,
        timestamp_ns: timestamp_ns(),
        recorder: recorder.to_string(),
        check: check.to_string(),
        passed: failure_kind.is_none(),
        failure_kind,
        message,
    }));
}

/// Replaces an argument whose JSON form exceeds `threshold` bytes with a
/// `<hash:sha256:XXXXXXXXXXXXXXXX>` marker.
pub fn compact_argument(value: &Value, threshold: usize) -> Value {
    let rendered = value.to_string();
    if rendered.len() <= threshold {
        return value.clone();
    }
    let hash = Sha256::digest(rendered.as_bytes());
    Value::String(format!("<hash:sha256:{}>", hex_bytes(&hash[..8])))
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
