use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSection;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
