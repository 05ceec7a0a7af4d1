//! # Moderation
//!
//! The rick list: custom commands from listed users are swapped for a rick roll by an
//! interceptor before they reach the custom command executor. `?ricklist` explains it.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::reply;
use crate::application::registry::{ExecutionContext, Executor, Feature, Interceptor, Parser};
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Command, CommandType, Request, UserId};
use crate::strings;
use crate::strings::messages;

pub const NAME: &str = "?ricklist";

pub struct ModerationFeature {
    rick_list: Arc<Vec<UserId>>,
}

impl ModerationFeature {
    pub fn new(rick_list: Vec<UserId>) -> Self {
        Self {
            rick_list: Arc::new(rick_list),
        }
    }
}

impl Feature for ModerationFeature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>> {
        vec![Arc::new(RickListParser)]
    }

    fn executors(&self) -> Vec<Arc<dyn Executor>> {
        vec![
            Arc::new(RickListInfoExecutor {
                rick_list: self.rick_list.clone(),
            }),
            Arc::new(RickRollExecutor),
        ]
    }

    fn interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        vec![Arc::new(RickListInterceptor {
            rick_list: self.rick_list.iter().cloned().collect(),
        })]
    }
}

struct RickListParser;

impl Parser for RickListParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn help_text(&self) -> &'static str {
        strings::help::RICKLIST
    }

    fn parse(&self, _tokens: &[&str]) -> Result<Request> {
        Ok(Request::RickListInfo)
    }
}

struct RickListInterceptor {
    rick_list: HashSet<UserId>,
}

#[async_trait]
impl Interceptor for RickListInterceptor {
    async fn intercept(&self, command: Command, _chat: &dyn ChatProvider) -> Result<Command> {
        if command.command_type() != CommandType::Custom
            || !self.rick_list.contains(&command.author)
        {
            return Ok(command);
        }
        tracing::info!("Rick rolling {} in {}", command.author, command.channel);
        Ok(Command::new(command.author, command.channel, Request::RickRoll))
    }
}

struct RickRollExecutor;

#[async_trait]
impl Executor for RickRollExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::RickRoll
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        reply(ctx.chat, &command.channel, messages::RICK_ROLL).await
    }
}

struct RickListInfoExecutor {
    rick_list: Arc<Vec<UserId>>,
}

#[async_trait]
impl Executor for RickListInfoExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::RickListInfo
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let members = if self.rick_list.is_empty() {
            messages::RICK_LIST_EMPTY.to_string()
        } else {
            let mut names = Vec::with_capacity(self.rick_list.len());
            for user in self.rick_list.iter() {
                // Cosmetic only, so a failed lookup falls back to the raw id.
                let name = match ctx.chat.display_name(&command.channel, user).await {
                    Ok(name) => name,
                    Err(e) => {
                        tracing::warn!("Could not resolve display name of {}: {}", user, e);
                        user.to_string()
                    }
                };
                names.push(name);
            }
            messages::rick_list_members(&names)
        };
        let text = format!("{}\n{}", messages::RICK_LIST_INFO, members);
        reply(ctx.chat, &command.channel, &text).await
    }
}
