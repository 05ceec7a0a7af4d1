//! # Command Features
//!
//! One module per feature. Each exposes a [`Feature`] bundling its parsers, executors and
//! interceptors; [`build_registry`] wires them all together at startup.

pub mod custom;
pub mod help;
pub mod learn;
pub mod list;
pub mod moderation;
pub mod vote;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::application::registry::{Feature, FeatureRegistry, RegistryError};
use crate::application::vote::VoteBook;
use crate::domain::traits::{ChatProvider, Clock, Gist, StringMap, Timer};
use crate::domain::types::{ChannelId, Command, UserId};

/// Everything the builtin features need from the outside world.
pub struct FeatureDeps {
    pub commands: Arc<dyn StringMap>,
    pub votes: Arc<VoteBook>,
    pub gist: Option<Arc<dyn Gist>>,
    pub clock: Arc<dyn Clock>,
    pub timer: Arc<dyn Timer>,
    pub vote_duration: Duration,
    pub rick_list: Vec<UserId>,
}

pub fn build_registry(deps: FeatureDeps) -> Result<FeatureRegistry, RegistryError> {
    let features: Vec<Box<dyn Feature>> = vec![
        Box::new(help::HelpFeature),
        Box::new(learn::LearnFeature::new(deps.commands.clone())),
        Box::new(custom::CustomFeature::new(deps.commands.clone())),
        Box::new(list::ListFeature::new(deps.commands.clone(), deps.gist)),
        Box::new(moderation::ModerationFeature::new(deps.rick_list)),
        Box::new(vote::VoteFeature::new(
            deps.votes,
            deps.clock,
            deps.timer,
            deps.vote_duration,
        )),
    ];

    let mut registry = FeatureRegistry::new();
    for feature in &features {
        registry.register(feature.as_ref())?;
    }
    Ok(registry)
}

pub(crate) async fn reply(
    chat: &dyn ChatProvider,
    channel: &ChannelId,
    content: &str,
) -> Result<()> {
    chat.send_message(channel, content)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}

/// Executors are only ever handed their own request type; anything else is a wiring bug.
pub(crate) fn mismatch(executor: &str, command: &Command) -> anyhow::Error {
    anyhow::anyhow!(
        "{} executor received {:?} command",
        executor,
        command.command_type()
    )
}
