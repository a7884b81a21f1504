use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub(crate) const LOG_ENV: &str = "MODSCRIPT_LOG";

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber once per process.
///
/// `filter` wins over `MODSCRIPT_LOG`; with neither set only warnings and
/// errors are shown. Stdout stays reserved for the line protocol.
pub(crate) fn init_tracing(filter: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let filter = match filter {
            Some(directives) => EnvFilter::try_new(directives).map_err(|_| ()),
            None => EnvFilter::try_from_env(LOG_ENV).map_err(|_| ()),
        }
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init();
    });
}
