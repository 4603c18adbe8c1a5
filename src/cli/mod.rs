//! CLI module for the User Identity API

pub mod serve;

use clap::{Parser, Subcommand};

/// User Identity API - user lifecycle management backed by AWS Cognito
#[derive(Parser)]
#[command(name = "user-identity-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}
