//! # Command Router
//!
//! Entry point for inbound chat messages. Filters out non-human senders, parses the text
//! into a [`Command`] and hands it to the dispatch queue. Nothing here mutates bot state;
//! the only store access is the read-only custom command lookup done while parsing.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;

use crate::application::dispatch::CommandSender;
use crate::application::parsing::parse_command;
use crate::application::registry::FeatureRegistry;
use crate::domain::traits::StringMap;
use crate::domain::types::{ChannelId, Command, Request, UserId};

pub struct CommandRouter {
    registry: Arc<FeatureRegistry>,
    commands: Arc<dyn StringMap>,
    queue: CommandSender,
    ignored_senders: HashSet<UserId>,
}

impl CommandRouter {
    pub fn new(
        registry: Arc<FeatureRegistry>,
        commands: Arc<dyn StringMap>,
        queue: CommandSender,
        ignored_senders: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            registry,
            commands,
            queue,
            ignored_senders: ignored_senders.into_iter().collect(),
        }
    }

    pub async fn route(&self, channel: &ChannelId, message: &str, sender: &UserId) -> Result<()> {
        if self.ignored_senders.contains(sender) {
            tracing::debug!("Ignoring message from non-human sender {}", sender);
            return Ok(());
        }

        let request = parse_command(message, &self.registry, self.commands.as_ref()).await?;
        match request {
            Request::None => return Ok(()),
            Request::Unrecognized => {
                tracing::debug!("Unrecognized command from {}: {}", sender, message);
                return Ok(());
            }
            _ => {}
        }

        tracing::info!(
            "Router queueing {:?} from '{}' in '{}'",
            request.command_type(),
            sender,
            channel
        );
        self.queue
            .send(Command::new(sender.clone(), channel.clone(), request))
            .await
            .context("command queue closed")
    }
}
