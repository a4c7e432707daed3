//! Tracing bootstrap for the CLI.

use tracing_subscriber::EnvFilter;

/// Initializes stdout logging. `RUST_LOG` wins when set; otherwise the
/// verbosity flags and the debug toggle pick the default filter.
pub fn init_logging(verbose: u8, debug: bool) {
	let default_filter = match (verbose, debug) {
		(0, false) => "drover=warn",
		(0, true) | (1, _) => "drover=info",
		_ => "drover=debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.compact()
		.init();
}
