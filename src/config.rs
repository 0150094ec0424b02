//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "timekeeper")]
#[command(about = "Per-event stopwatch and countdown timers for a personal task planner")]
#[command(version)]
pub struct Config {
    /// Port to bind the local API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// SQLite database holding the planner's events; kept in memory when omitted
    #[arg(short, long)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
