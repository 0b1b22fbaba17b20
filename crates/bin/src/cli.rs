//! CLI argument definitions for the Gatehouse binary.

use clap::{Parser, Subcommand};

/// Gatehouse identity front-door server
#[derive(Parser, Debug)]
#[command(name = "gatehouse")]
#[command(about = "Gatehouse: identifier resolution and session issuance service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Gatehouse server
    Serve(ServeArgs),
    /// Check health of a running Gatehouse server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "GATEHOUSE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "GATEHOUSE_HOST")]
    pub host: String,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Port of the server to check
    #[arg(short, long, default_value_t = 3000, env = "GATEHOUSE_PORT")]
    pub port: u16,

    /// Host of the server to check
    #[arg(long, default_value = "127.0.0.1", env = "GATEHOUSE_HOST")]
    pub host: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
