use crate::config::LoggingConfig;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

/// One JSON object per line on stdout. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &LoggingConfig) {
    env_logger::Builder::from_env(Env::default().default_filter_or(config.level.as_str()))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}
