//! Command line interface
//!
//! - `serve`: run the HTTP API
//! - `analyze`: analyze one log file and print the report

pub mod analyze;
pub mod serve;

use clap::{Parser, Subcommand};

/// Incident Log Analyzer - find the log lines that explain an incident
#[derive(Parser)]
#[command(name = "incident-log-analyzer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Analyze a log file against an incident prompt and print JSON
    Analyze(analyze::AnalyzeArgs),
}
