//! # Learn / Unlearn Commands
//!
//! `?learn <call> <response>` adds a custom command to the table, `?unlearn <call>` removes it.
//! Anything malformed is answered with the command's usage text.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

use super::{mismatch, reply};
use crate::application::parsing::SIGIL;
use crate::application::registry::{ExecutionContext, Executor, Feature, Parser};
use crate::domain::traits::StringMap;
use crate::domain::types::{Command, CommandType, LearnData, Request, UnlearnData};
use crate::strings;
use crate::strings::messages;

pub const LEARN: &str = "?learn";
pub const UNLEARN: &str = "?unlearn";

/// One word that doesn't look like another bot's command.
static CALL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^?!/\s]\S*$").expect("call pattern is valid"));

/// Responses may span lines and words but not start like a command.
static RESPONSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^?!/\s]").expect("response pattern is valid"));

fn valid_call(call: &str) -> bool {
    CALL_PATTERN.is_match(call)
}

fn valid_response(response: &str) -> bool {
    RESPONSE_PATTERN.is_match(response)
}

pub struct LearnFeature {
    commands: Arc<dyn StringMap>,
}

impl LearnFeature {
    pub fn new(commands: Arc<dyn StringMap>) -> Self {
        Self { commands }
    }
}

impl Feature for LearnFeature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>> {
        vec![Arc::new(LearnParser), Arc::new(UnlearnParser)]
    }

    fn executors(&self) -> Vec<Arc<dyn Executor>> {
        vec![
            Arc::new(LearnExecutor {
                commands: self.commands.clone(),
            }),
            Arc::new(UnlearnExecutor {
                commands: self.commands.clone(),
            }),
        ]
    }
}

struct LearnParser;

impl Parser for LearnParser {
    fn name(&self) -> &'static str {
        LEARN
    }

    fn help_text(&self) -> &'static str {
        strings::help::LEARN
    }

    fn parse(&self, tokens: &[&str]) -> Result<Request> {
        if tokens.len() < 3 {
            return Ok(Request::help_for(LEARN));
        }
        let call = tokens[1];
        let response = tokens[2..].join(" ");
        if !valid_call(call) || !valid_response(&response) {
            return Ok(Request::help_for(LEARN));
        }
        Ok(Request::Learn(LearnData {
            call: call.to_string(),
            response,
        }))
    }
}

struct UnlearnParser;

impl Parser for UnlearnParser {
    fn name(&self) -> &'static str {
        UNLEARN
    }

    fn help_text(&self) -> &'static str {
        strings::help::UNLEARN
    }

    fn parse(&self, tokens: &[&str]) -> Result<Request> {
        match tokens {
            [_, call] if valid_call(call) => Ok(Request::Unlearn(UnlearnData {
                call: call.to_string(),
            })),
            _ => Ok(Request::help_for(UNLEARN)),
        }
    }
}

fn is_builtin(ctx: &ExecutionContext<'_>, call: &str) -> bool {
    ctx.registry
        .parser_by_name(&format!("{SIGIL}{call}"))
        .is_some()
}

struct LearnExecutor {
    commands: Arc<dyn StringMap>,
}

#[async_trait]
impl Executor for LearnExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::Learn
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::Learn(data) = &command.request else {
            return Err(mismatch("learn", command));
        };

        if is_builtin(ctx, &data.call) || self.commands.has(&data.call).await? {
            return reply(ctx.chat, &command.channel, &messages::already_known(&data.call)).await;
        }

        self.commands.set(&data.call, &data.response).await?;
        tracing::info!("{} taught ?{}", command.author, data.call);
        reply(ctx.chat, &command.channel, &messages::learned(&data.call)).await
    }
}

struct UnlearnExecutor {
    commands: Arc<dyn StringMap>,
}

#[async_trait]
impl Executor for UnlearnExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::Unlearn
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::Unlearn(data) = &command.request else {
            return Err(mismatch("unlearn", command));
        };

        let message = if is_builtin(ctx, &data.call) {
            messages::cannot_unlearn_builtin(&data.call)
        } else if !self.commands.has(&data.call).await? {
            messages::unknown_call(&data.call)
        } else {
            self.commands.delete(&data.call).await?;
            tracing::info!("{} removed ?{}", command.author, data.call);
            messages::forgot(&data.call)
        };
        reply(ctx.chat, &command.channel, &message).await
    }
}
