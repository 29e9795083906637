//! A bad config file named by `LAMBDA_RECORDER_CONFIG` stops the first
//! recorder construction. Separate binary: the config is loaded once per process.

use lambda_recorder::config::{config_from_env, CONFIG_ENV_VAR};
use lambda_recorder::{LambdaRecorder, RecorderError};
use std::panic::catch_unwind;

#[test]
fn invalid_env_config_panics_on_first_recorder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("recorder.toml");
    std::fs::write(&config_path, "[assertions]\nmax_rendered_value_bytes = 2\n")
        .expect("write config");
    std::env::set_var(CONFIG_ENV_VAR, &config_path);

    assert!(matches!(config_from_env(), Err(RecorderError::InvalidConfig(_))));

    let outcome = catch_unwind(|| {
        let _recorder: LambdaRecorder<()> = LambdaRecorder::new(|()| {});
    });
    let message = match outcome {
        Ok(()) => panic!("construction should fail"),
        Err(payload) => payload
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default(),
    };
    assert!(message.starts_with(CONFIG_ENV_VAR), "{message}");
    assert!(message.contains("max_rendered_value_bytes"), "{message}");
}
