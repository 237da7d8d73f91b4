//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use chronicle_core::config::LoggingConfig;

static INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Idempotent: only the
/// first call has any effect, and an already installed subscriber (for
/// instance one set by the host application) is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true);

        let installed = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let config = LoggingConfig {
            level: "not a valid directive ===".to_string(),
            json: true,
        };
        init_tracing(&config);
        init_tracing(&LoggingConfig::default());
        tracing::info!("still logging");
    }
}
