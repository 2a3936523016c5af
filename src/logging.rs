use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber. Silent unless `RUST_LOG` is set
/// (e.g. `RUST_LOG=schema_resolve=debug`).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
