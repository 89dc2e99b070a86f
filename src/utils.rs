use tracing_subscriber::EnvFilter;

/// Set up logging to stderr
///
/// `RUST_LOG` wins when set, otherwise each level of verbosity shows one more level of detail.
#[mutants::skip] // Cannot test directly, installs a global subscriber
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
