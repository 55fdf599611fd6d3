//! Logger setup for the server process.
//!
//! Logs go to stderr: stdout carries the JSON-RPC stream.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "tinct_core=debug,tower_lsp=warn"). When unset, `RUST_LOG` is used, then
/// `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            // Editors capture stderr into a log panel, not a terminal.
            write_style: env_logger::WriteStyle::Never,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);
        builder.target(env_logger::Target::Stderr);
        builder.init();

        log::debug!("logging initialized");
    });
}
