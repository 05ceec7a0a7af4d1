//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the Matrix login, storage paths, vote rules, and moderation lists.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub vote: VoteConfig,
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub gist: Option<GistConfig>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        if config.vote.quorum == 0 {
            anyhow::bail!("vote.quorum must be at least 1");
        }
        Ok(config)
    }
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_commands_path")]
    pub commands_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            commands_path: default_commands_path(),
        }
    }
}

fn default_commands_path() -> String {
    "data/commands.json".to_string()
}

/// Rules for `?vote`.
#[derive(Debug, Deserialize, Clone)]
pub struct VoteConfig {
    #[serde(default = "default_vote_duration")]
    pub duration_secs: u64,
    /// Ballots on one side needed to resolve a vote.
    #[serde(default = "default_quorum")]
    pub quorum: usize,
}

impl VoteConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_vote_duration(),
            quorum: default_quorum(),
        }
    }
}

fn default_vote_duration() -> u64 {
    300
}
fn default_quorum() -> usize {
    5
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ModerationConfig {
    /// Users whose custom commands get answered with a rick roll.
    #[serde(default)]
    pub rick_list: Vec<String>,
    /// Non-human senders (bridges, other bots) whose messages are never parsed.
    #[serde(default)]
    pub ignored_senders: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GistConfig {
    pub token: String,
    #[serde(default = "default_gist_api")]
    pub api_url: String,
}

fn default_gist_api() -> String {
    "https://api.github.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_executor_timeout")]
    pub executor_timeout_secs: u64,
}

impl DispatchConfig {
    pub fn executor_timeout(&self) -> Duration {
        Duration::from_secs(self.executor_timeout_secs)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            executor_timeout_secs: default_executor_timeout(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}
fn default_executor_timeout() -> u64 {
    30
}
