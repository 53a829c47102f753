use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Your bearer token
    #[arg(long, env = "SOCIAL_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Base url of the social API
    #[arg(long, env = "SOCIAL_API_URL", default_value = "http://localhost:8080/api")]
    api_url: String,
    /// Username you are logged in as
    #[arg(short, long, env = "SOCIAL_USERNAME")]
    username: Option<String>,
    /// Limit request concurrency
    #[arg(long, default_value = "5")]
    limit: usize,
    /// Override the search debounce window (milliseconds)
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show your feed
    Feed {
        #[arg(long, default_value = "0")]
        page: u32,
    },
    /// Show a profile and its posts
    Profile { username: String },
    /// Show one post with its comments
    Post { id: u64 },
    /// Like or unlike a post
    Like {
        id: u64,
        /// Ask the server for the current like state first
        #[arg(long)]
        verify: bool,
    },
    /// Comment on a post
    Comment { id: u64, content: String },
    /// Delete one of your comments
    Uncomment { id: u64, comment_id: Option<u64> },
    /// Delete one of your posts
    Delete { id: u64 },
    /// Search users, reading one query per line from stdin
    Search,
    Follow { username: String },
    Unfollow { username: String },
    /// List followers (or followed users), filtered by lines read from stdin
    Followers {
        username: String,
        #[arg(long)]
        following: bool,
    },
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }
    pub fn token(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| token.trim_start_matches("Bearer ").to_string())
    }
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
    pub fn username(&self) -> Option<String> {
        self.username.clone()
    }
    pub const fn limit(&self) -> usize {
        self.limit
    }
    pub fn debounce(&self, default: Duration) -> Duration {
        self.debounce_ms.map(Duration::from_millis).unwrap_or(default)
    }
}
