//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "take-five")]
#[command(about = "A state-managed Pomodoro timer daemon with an HTTP control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20525")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Path to the duration settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Log phase completions instead of posting desktop notifications
    #[arg(long)]
    pub no_desktop_notify: bool,

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
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Settings file location: the CLI override, or the default under
    /// the user's local data directory
    pub fn settings_path(&self) -> PathBuf {
        match &self.settings {
            Some(path) => path.clone(),
            None => {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home)
                    .join(".local/share/take-five")
                    .join("settings.json")
            }
        }
    }
}
