//! Clap derive structures for the `circuitstats` binary.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// circuitstats -- WAN circuit dashboard for Juniper Mist gateways
#[derive(Debug, Parser)]
#[command(
    name = "circuitstats",
    version,
    about = "Serve a dashboard of Mist gateway WAN port traffic",
    propagate_version = true
)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, short = 'c', env = "CIRCUITSTATS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the dashboard web server (default)
    Serve(ServeArgs),

    /// Resolve the organization once and report what the token can see
    Check,
}

#[derive(Debug, Default, clap::Args)]
pub struct ServeArgs {
    /// Listen port (overrides PORT)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Listen address (overrides BIND_ADDRESS)
    #[arg(long, short = 'b')]
    pub bind: Option<IpAddr>,
}
