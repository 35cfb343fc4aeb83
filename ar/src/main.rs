mod cli;
mod commands;
mod error;
mod util;

use anyhow::Context;
use structopt::StructOpt;

use cli::{CliOpts, Commands};

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());

    let level = if opts.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result: anyhow::Result<()> = match opts.cmd {
        Commands::Create(args) => commands::create(args, opts.verbose).context("create failed"),
        Commands::List(args) => commands::list(args).context("list failed"),
        Commands::Extract(args) => commands::extract(args, opts.verbose).context("extract failed"),
        Commands::Print(args) => commands::print(args).context("print failed"),
    };

    if let Err(e) = result {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
