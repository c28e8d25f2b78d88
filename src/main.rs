use clap::Parser;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unzipper::{Cli, OutputFormatter, OutputMode, UnzipperError, Unzipper};

fn main() {
    setup_logging();
    let exit_code = run(Cli::parse());
    process::exit(exit_code);
}

fn run(cli: Cli) -> i32 {
    let unzipper = match Unzipper::from_cli(&cli) {
        Ok(unzipper) => unzipper,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    // Per-archive failures are reported during the run and do not change the exit code
    match unzipper.run(&cli.root_path()) {
        Ok(_) => 0,
        Err(e) => {
            unzipper.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(error: &UnzipperError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging() {
    // stdout carries the user-facing diagnostics, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
