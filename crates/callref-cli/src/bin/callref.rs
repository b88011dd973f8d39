use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use callref_cli::args::CliArgs;
use callref_cli::reporter::{Reporter, render_json};
use callref_cli::{driver, tracing_config};

const EXIT_SUCCESS: i32 = 0;
const EXIT_RESOLUTION_FAILED: i32 = 1;

fn main() -> Result<()> {
    // Only installs a subscriber when CALLREF_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let report = driver::run(&args, &cwd)?;

    if args.json {
        println!("{}", render_json(&report)?);
    } else {
        let color = !args.no_color && std::io::stdout().is_terminal();
        let mut reporter = Reporter::new(color);
        print!("{}", reporter.render_report(&report));
    }

    std::process::exit(if report.success {
        EXIT_SUCCESS
    } else {
        EXIT_RESOLUTION_FAILED
    });
}
