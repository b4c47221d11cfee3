// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod error;
mod info;
mod metrics;
mod pattern;
mod play;
mod session;
mod utils;

use clap::{Parser, Subcommand};
use error::result_to_exit_code;
use std::process::ExitCode;

/// omxsink CLI - Raspberry Pi OpenMAX video output driver
#[derive(Parser)]
#[command(name = "omxsink")]
#[command(version)]
#[command(about = "omxsink CLI - Raspberry Pi OpenMAX video output driver")]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=trace for hardware calls)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output statistics and port information in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Drive the in-memory mock instead of the VideoCore hardware
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display a moving I420 test pattern
    Pattern(pattern::Args),

    /// Play raw I420 frames from a file
    Play(play::Args),

    /// Show the video render port definition
    Info(info::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Pattern(args) => pattern::execute(args, cli.json, cli.mock),
        Commands::Play(args) => play::execute(args, cli.json, cli.mock),
        Commands::Info(args) => info::execute(args, cli.json, cli.mock),
    };

    result_to_exit_code(result)
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    let env = env_logger::Env::default();

    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("info")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::debug!("Logging initialized");
}
