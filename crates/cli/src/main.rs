use clap::Parser;
use drover::{EventDispatcher, RunLauncher};

mod cli;
mod logging;

#[tokio::main]
async fn main() {
	let args = cli::Cli::parse();
	logging::init_logging(args.verbose, args.debug);

	let dispatcher = EventDispatcher::new();
	let mut launcher = RunLauncher::new(dispatcher);
	let code = launcher.run(args.into_configuration()).await;
	std::process::exit(code);
}
