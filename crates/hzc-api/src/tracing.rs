//! Log output setup.

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is not set
pub const fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Development => "debug,hzc_db=trace,tower_http=debug,hyper=info",
        Environment::Production => "info,tower_http=info",
    }
}

/// Install the global subscriber.
///
/// Development logs are pretty-printed with source locations. Production
/// logs are one JSON object per line with the event fields flattened.
/// `RUST_LOG` replaces the default filter, e.g. `RUST_LOG=info,hzc_db=trace`.
pub fn init_tracing(env: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let output: Box<dyn Layer<Registry> + Send + Sync> = if env.is_development() {
        fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .init();

    tracing::info!(?env, "tracing initialized");
}
