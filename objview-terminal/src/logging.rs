//! Logger setup for the `objview` binary
use std::sync::Once;

use env_logger::WriteStyle;
use log::LevelFilter;

/// Level used when neither `--log` nor `RUST_LOG` is given. Log lines land
/// on top of the raw-mode frame, so only problems get through.
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "debug",
/// "objview_core=debug,naga=warn") and takes precedence over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// From `--color`
    pub write_style: WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: WriteStyle::Auto,
        }
    }
}

/// Where the active filter comes from
#[derive(Debug, PartialEq, Eq)]
enum FilterSource {
    Explicit(String),
    Environment(String),
    Default(LevelFilter),
}

fn filter_source(explicit: Option<String>, environment: Option<String>) -> FilterSource {
    match (explicit, environment) {
        (Some(filter), _) => FilterSource::Explicit(filter),
        (None, Some(filter)) if !filter.trim().is_empty() => FilterSource::Environment(filter),
        _ => FilterSource::Default(DEFAULT_LEVEL),
    }
}

fn builder(config: LoggingConfig, environment: Option<String>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    match filter_source(config.env_filter, environment) {
        FilterSource::Explicit(filter) | FilterSource::Environment(filter) => {
            builder.parse_filters(&filter);
        }
        FilterSource::Default(level) => {
            builder.filter_level(level);
        }
    }
    builder.write_style(config.write_style);
    builder
}

static INIT: Once = Once::new();

/// Installs the global logger on the first call; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let environment = std::env::var("RUST_LOG").ok();
        if let Err(e) = builder(config, environment).try_init() {
            eprintln!("objview: logger already installed: {e}");
            return;
        }
        log::debug!("logging initialized");
    });
}
