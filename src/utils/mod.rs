pub mod build_info;
pub mod paths;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default directive applied when `RUST_LOG` does not say otherwise.
pub const DEFAULT_LOG_DIRECTIVE: &str = "budget_folders=info";

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `directive`; an unparseable directive
/// falls back to [`DEFAULT_LOG_DIRECTIVE`].
pub fn init_tracing(directive: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(directive.unwrap_or(DEFAULT_LOG_DIRECTIVE))
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
        });

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
