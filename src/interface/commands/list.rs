//! # List Command
//!
//! Handles `?list`. Renders the custom command table and, when a gist uploader is configured,
//! publishes it there and replies with the link instead of flooding the channel.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::reply;
use crate::application::registry::{ExecutionContext, Executor, Feature, Parser};
use crate::domain::traits::{Gist, StringMap};
use crate::domain::types::{Command, CommandType, Request};
use crate::strings;
use crate::strings::messages;

pub const NAME: &str = "?list";

pub struct ListFeature {
    commands: Arc<dyn StringMap>,
    gist: Option<Arc<dyn Gist>>,
}

impl ListFeature {
    pub fn new(commands: Arc<dyn StringMap>, gist: Option<Arc<dyn Gist>>) -> Self {
        Self { commands, gist }
    }
}

impl Feature for ListFeature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>> {
        vec![Arc::new(ListParser)]
    }

    fn executors(&self) -> Vec<Arc<dyn Executor>> {
        vec![Arc::new(ListExecutor {
            commands: self.commands.clone(),
            gist: self.gist.clone(),
        })]
    }
}

struct ListParser;

impl Parser for ListParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn help_text(&self) -> &'static str {
        strings::help::LIST
    }

    fn parse(&self, _tokens: &[&str]) -> Result<Request> {
        Ok(Request::List)
    }
}

pub fn render_list(entries: &BTreeMap<String, String>) -> String {
    entries
        .iter()
        .map(|(call, response)| messages::list_line(call, response))
        .collect::<Vec<_>>()
        .join("\n")
}

struct ListExecutor {
    commands: Arc<dyn StringMap>,
    gist: Option<Arc<dyn Gist>>,
}

#[async_trait]
impl Executor for ListExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::List
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let entries = self.commands.all().await?;
        if entries.is_empty() {
            return reply(ctx.chat, &command.channel, messages::NO_CUSTOM_COMMANDS).await;
        }
        let listing = render_list(&entries);

        let Some(gist) = &self.gist else {
            return reply(ctx.chat, &command.channel, &listing).await;
        };
        match gist.upload(messages::LIST_DESCRIPTION, &listing).await {
            Ok(url) => reply(ctx.chat, &command.channel, &messages::list_uploaded(&url)).await,
            Err(e) => {
                tracing::error!("Failed to upload command list: {}", e);
                reply(ctx.chat, &command.channel, messages::LIST_UPLOAD_FAILED).await
            }
        }
    }
}
