//! # Help Command
//!
//! Handles `?help [command]`.
//! Without an argument (or with an unknown one) shows the main help list.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{mismatch, reply};
use crate::application::parsing::SIGIL;
use crate::application::registry::{ExecutionContext, Executor, Feature, Parser};
use crate::domain::types::{Command, CommandType, HelpData, Request};
use crate::strings;

pub const NAME: &str = "?help";

pub struct HelpFeature;

impl Feature for HelpFeature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>> {
        vec![Arc::new(HelpParser)]
    }

    fn executors(&self) -> Vec<Arc<dyn Executor>> {
        vec![Arc::new(HelpExecutor)]
    }
}

struct HelpParser;

impl Parser for HelpParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn help_text(&self) -> &'static str {
        strings::help::HELP
    }

    fn parse(&self, tokens: &[&str]) -> Result<Request> {
        let command = match tokens {
            [_] | [_, ""] => None,
            [_, topic] if topic.starts_with(SIGIL) => Some(topic.to_string()),
            [_, topic] => Some(format!("{SIGIL}{topic}")),
            _ => return Ok(Request::help_for(NAME)),
        };
        Ok(Request::Help(HelpData { command }))
    }
}

struct HelpExecutor;

#[async_trait]
impl Executor for HelpExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::Help
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::Help(data) = &command.request else {
            return Err(mismatch("help", command));
        };
        let text = data
            .command
            .as_deref()
            .and_then(|name| ctx.registry.parser_by_name(name))
            .map(|parser| parser.help_text())
            .unwrap_or(strings::help::MAIN);
        reply(ctx.chat, &command.channel, text).await
    }
}
