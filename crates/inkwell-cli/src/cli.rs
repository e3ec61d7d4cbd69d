use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "inkwell", about = "Inkwell community blogging server", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration file
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Session lifetime in seconds
    #[arg(long)]
    pub session_ttl: Option<u64>,

    /// Register a demo user and log a session token for it
    #[arg(long)]
    pub seed_demo: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file to merge over the defaults
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
