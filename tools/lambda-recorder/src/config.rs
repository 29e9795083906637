use crate::errors::RecorderError;
use crate::logging::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::trace::init_trace_sink;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Names the TOML file read by [`global_config`].
pub const CONFIG_ENV_VAR: &str = "LAMBDA_RECORDER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecorderConfig {
    pub assertions: AssertionConfig,
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionConfig {
    pub max_rendered_value_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
    pub hash_arguments_over_bytes: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            assertions: AssertionConfig {
                max_rendered_value_bytes: 256,
            },
            trace: TraceConfig {
                path: None,
                max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
                hash_arguments_over_bytes: 1024,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialRecorderConfig {
    assertions: Option<PartialAssertionConfig>,
    trace: Option<PartialTraceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAssertionConfig {
    max_rendered_value_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialTraceConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    hash_arguments_over_bytes: Option<usize>,
}

/// Parses a config document. Relative trace paths are resolved against `base_dir`.
pub fn parse_config(contents: &str, base_dir: &Path) -> Result<RecorderConfig, RecorderError> {
    let partial: PartialRecorderConfig =
        toml::from_str(contents).map_err(|e| RecorderError::ConfigParse(e.to_string()))?;
    let mut cfg = RecorderConfig::default();
    merge_partial_config(&mut cfg, partial, base_dir);
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<RecorderConfig, RecorderError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RecorderError::Io(format!("read {}: {e}", path.display())))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&contents, base_dir)
}

/// Loads the file named by [`CONFIG_ENV_VAR`], or defaults when it is unset.
pub fn config_from_env() -> Result<RecorderConfig, RecorderError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(Path::new(&path)),
        _ => Ok(RecorderConfig::default()),
    }
}

static GLOBAL_CONFIG: OnceLock<RecorderConfig> = OnceLock::new();

/// Process-wide config, loaded on first use.
///
/// Installs the trace sink when `trace.path` is set. Panics if the file named
/// by [`CONFIG_ENV_VAR`] cannot be loaded or the sink cannot be opened.
pub fn global_config() -> &'static RecorderConfig {
    GLOBAL_CONFIG.get_or_init(|| {
        let cfg = config_from_env().unwrap_or_else(|e| panic!("{CONFIG_ENV_VAR}: {e}"));
        if let Some(path) = &cfg.trace.path {
            init_trace_sink(path, &cfg.trace)
                .unwrap_or_else(|e| panic!("trace sink {}: {e}", path.display()));
        }
        cfg
    })
}

fn merge_partial_config(cfg: &mut RecorderConfig, partial: PartialRecorderConfig, base_dir: &Path) {
    if let Some(assertions) = partial.assertions {
        if let Some(value) = assertions.max_rendered_value_bytes {
            cfg.assertions.max_rendered_value_bytes = value;
        }
    }

    if let Some(trace) = partial.trace {
        if let Some(path) = trace.path {
            cfg.trace.path = Some(absolutize_path(base_dir, &path));
        }
        if let Some(value) = trace.max_payload_bytes {
            cfg.trace.max_payload_bytes = value;
        }
        if let Some(value) = trace.hash_arguments_over_bytes {
            cfg.trace.hash_arguments_over_bytes = value;
        }
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &RecorderConfig) -> Result<(), RecorderError> {
    if cfg.assertions.max_rendered_value_bytes < 8 {
        return Err(RecorderError::InvalidConfig(
            "assertions.max_rendered_value_bytes must be at least 8".to_string(),
        ));
    }
    if cfg.trace.max_payload_bytes == 0 {
        return Err(RecorderError::InvalidConfig(
            "trace.max_payload_bytes must be greater than zero".to_string(),
        ));
    }
    if cfg.trace.hash_arguments_over_bytes == 0 {
        return Err(RecorderError::InvalidConfig(
            "trace.hash_arguments_over_bytes must be greater than zero".to_string(),
        ));
    }
    if cfg
        .trace
        .path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(RecorderError::InvalidConfig(
            "trace.path must not be empty".to_string(),
        ));
    }
    Ok(())
}
