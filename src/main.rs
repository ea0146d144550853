//! goheft - list the sizes of the static libraries linked into a Go binary
//!
//! Rebuilds a Go program with `go build -work -a -v`, inspects the build's work
//! directory and reports every package archive by size.

use anyhow::Result;
use clap::Parser;
use goheft::cli::{Args, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Create and run the CLI application
    let app = CliApp::new(args);
    let exit_code = app.run().await?;

    // Exit with the appropriate code
    std::process::exit(exit_code);
}
