use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins; otherwise `--verbose` turns on
/// debug output for this crate's binaries and library.
pub fn init(verbose: bool) {
    let default = if verbose {
        "info,ghcs=debug,ghs=debug,ghcs_lib=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
