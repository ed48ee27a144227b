//! Configuration and CLI argument handling

use std::time::Duration;
use chrono::{DateTime, FixedOffset};
use clap::Parser;

use crate::countdown::TimeSource;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-sync")]
#[command(about = "A network-synchronized countdown service")]
#[command(version)]
pub struct Config {
    /// Target instant, ISO 8601 with an explicit UTC offset
    #[arg(long, default_value = "2026-01-01T00:00:00+08:00", value_parser = parse_target)]
    pub target: DateTime<FixedOffset>,

    /// Reference time endpoint returning JSON with a `unixtime` field
    #[arg(long, default_value = "https://worldtimeapi.org/api/timezone/Asia/Shanghai")]
    pub time_api_url: String,

    /// Timeout for the reference time fetch in milliseconds
    #[arg(long, default_value = "3000")]
    pub sync_timeout_ms: u64,

    /// Seconds left at which tick cues start
    #[arg(short, long, default_value = "10")]
    pub critical_threshold: i64,

    /// Seconds left after a diagnostic test trigger
    #[arg(long, default_value = "15")]
    pub test_lead_seconds: i64,

    /// Frame period in milliseconds
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Ring the terminal bell for audio cues
    #[arg(long)]
    pub bell: bool,

    /// Log the countdown to the console as it changes
    #[arg(long)]
    pub console: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse an RFC 3339 / ISO 8601 instant that carries its own offset
pub fn parse_target(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid target instant '{}': {}", s, e))
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

    pub fn time_source(&self) -> TimeSource {
        TimeSource::new(self.time_api_url.clone(), Duration::from_millis(self.sync_timeout_ms))
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}
