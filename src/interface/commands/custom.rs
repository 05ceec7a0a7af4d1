//! # Custom Commands
//!
//! Replays responses taught with `?learn`. Owns the fallback parser, which the parsing step
//! only consults after confirming the keyword exists in the command table.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{mismatch, reply};
use crate::application::parsing::{SIGIL, rest};
use crate::application::registry::{ExecutionContext, Executor, Feature, Parser};
use crate::domain::traits::StringMap;
use crate::domain::types::{Command, CommandType, CustomData, Request};

/// Placeholder in a learned response that is replaced with the caller's arguments.
pub const ARGS_PLACEHOLDER: &str = "$1";

pub struct CustomFeature {
    commands: Arc<dyn StringMap>,
}

impl CustomFeature {
    pub fn new(commands: Arc<dyn StringMap>) -> Self {
        Self { commands }
    }
}

impl Feature for CustomFeature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>> {
        Vec::new()
    }

    fn executors(&self) -> Vec<Arc<dyn Executor>> {
        vec![Arc::new(CustomExecutor {
            commands: self.commands.clone(),
        })]
    }

    fn fallback_parser(&self) -> Option<Arc<dyn Parser>> {
        Some(Arc::new(CustomParser))
    }
}

struct CustomParser;

impl Parser for CustomParser {
    fn name(&self) -> &'static str {
        "?<custom>"
    }

    fn help_text(&self) -> &'static str {
        ""
    }

    fn parse(&self, tokens: &[&str]) -> Result<Request> {
        let call = tokens[0].strip_prefix(SIGIL).unwrap_or(tokens[0]);
        Ok(Request::Custom(CustomData {
            call: call.to_string(),
            args: rest(tokens),
        }))
    }
}

pub fn render_response(response: &str, args: &str) -> String {
    response.replace(ARGS_PLACEHOLDER, args)
}

struct CustomExecutor {
    commands: Arc<dyn StringMap>,
}

#[async_trait]
impl Executor for CustomExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::Custom
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::Custom(data) = &command.request else {
            return Err(mismatch("custom", command));
        };
        // Unlearned between parsing and execution.
        let Some(response) = self.commands.get(&data.call).await? else {
            tracing::debug!("?{} vanished before it could run", data.call);
            return Ok(());
        };
        reply(ctx.chat, &command.channel, &render_response(&response, &data.args)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ALICE, Runner};

    #[test]
    fn test_parse_splits_call_and_args() {
        assert_eq!(
            CustomParser.parse(&["?greet", "the", "world"]).unwrap(),
            Request::Custom(CustomData {
                call: "greet".to_string(),
                args: "the world".to_string(),
            })
        );
    }

    #[test]
    fn test_render_response() {
        assert_eq!(render_response("hello $1!", "world"), "hello world!");
        assert_eq!(render_response("$1 and $1", "x"), "x and x");
        assert_eq!(render_response("plain", "ignored"), "plain");
        assert_eq!(render_response("hello $1", ""), "hello ");
    }

    #[tokio::test]
    async fn test_custom_command_with_args() {
        let mut runner = Runner::new();
        runner.commands.set("greet", "hello $1").await.unwrap();
        runner.assert_reply(ALICE, "?greet big world", "hello big world").await;
    }
}
