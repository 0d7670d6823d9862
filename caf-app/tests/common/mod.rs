use std::sync::OnceLock;

use caf_common::observability::{LogConfig, LogFormat, init_logging};

static INIT: OnceLock<()> = OnceLock::new();

/// Send test-run events to stderr only; `CAF_TEST_LOG_FORMAT=json` switches encoding.
pub fn init_test_tracing() {
    INIT.get_or_init(|| {
        let config = LogConfig {
            app_name: "caf-tests",
            log_file: None,
            emit_stderr: true,
            format: if std::env::var("CAF_TEST_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };
        let _ = init_logging(config);
    });
}
