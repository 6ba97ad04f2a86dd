//! Process setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize logging with tracing_subscriber. `RUST_LOG` directives are
/// applied first; the defaults below are added on top.
pub fn init_logging() {
    let filter = ["hyper=warn", "reqwest=warn", "seo_audit=debug", "info"]
        .iter()
        .fold(EnvFilter::from_default_env(), |filter, directive| {
            match directive.parse() {
                Ok(d) => filter.add_directive(d),
                Err(_) => filter,
            }
        });

    // try_init so tests and embedding applications can install their own subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .try_init();
}
