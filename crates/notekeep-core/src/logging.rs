// Logger bootstrap and environment-mode detection.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

/// Detect the current environment mode. Checks `NOTEKEEP_ENV` then
/// `RUST_ENV`; anything unrecognized is treated as development.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("NOTEKEEP_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default()
            .to_lowercase();

        match env_val.as_str() {
            "production" | "prod" => EnvMode::Production,
            "test" | "testing" => EnvMode::Test,
            _ => EnvMode::Development,
        }
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

/// Initialize the `tracing` subscriber. Call once from the binary.
///
/// `RUST_LOG` takes precedence; otherwise production gets a compact
/// info-level format and development a pretty debug-level one.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production() {
            EnvFilter::new("notekeep=info")
        } else {
            EnvFilter::new("notekeep=debug")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if is_production() {
        builder.compact().init();
    } else {
        builder.pretty().init();
    }
}
