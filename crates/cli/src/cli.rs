use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Buy tickets on the show ticketing site from a TOML purchase plan.
#[derive(Parser, Debug)]
#[command(name = "showticket")]
#[command(about = "Ticket purchasing client for the show ticketing site")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: (),

    /// Configuration file
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "SHOWTICKET_CONFIG"
    )]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Build the order and print it without submitting anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Log filter used when RUST_LOG is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
