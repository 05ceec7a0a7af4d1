//! # Domain Traits
//!
//! Abstract interfaces for the collaborators the bot talks to (chat transport, storage,
//! gist uploads, time). Implementations live in the Infrastructure layer; tests swap in fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::types::{ChannelId, Command, UserId};

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to a channel. Returns the id of the sent event.
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<String, String>;

    /// Resolve a user's display name as seen from the given channel.
    async fn display_name(&self, channel: &ChannelId, user: &UserId) -> Result<String, String>;
}

/// Thread-safe string keyed store (custom command table).
#[async_trait]
pub trait StringMap: Send + Sync {
    async fn has(&self, key: &str) -> anyhow::Result<bool>;

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Snapshot of every entry, ordered by key.
    async fn all(&self) -> anyhow::Result<BTreeMap<String, String>>;
}

/// Uploads text somewhere shareable and returns its URL.
#[async_trait]
pub trait Gist: Send + Sync {
    async fn upload(&self, description: &str, content: &str) -> Result<String, String>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Posts a command back onto the dispatch queue after a delay.
///
/// Implementations must never run the command themselves: the dispatch loop is the only
/// place state changes happen.
pub trait Timer: Send + Sync {
    fn schedule(&self, after: Duration, command: Command);
}
