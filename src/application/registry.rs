//! # Feature Registry
//!
//! Features plug parsers, executors and interceptors into the bot at startup:
//! - Parsers are looked up by keyword (`?vote`), sigil included
//! - Executors are looked up by the [`CommandType`] of a parsed request
//! - Interceptors run, in registration order, before every execution
//!
//! Registration rejects duplicate keywords, duplicate executor types and a second
//! fallback parser. Conflicts are a startup bug, so `main` treats them as fatal.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::traits::ChatProvider;
use crate::domain::types::{Command, CommandType, Request};

/// Turns the tokens of one message into a request.
pub trait Parser: Send + Sync {
    /// Keyword this parser answers to, sigil included.
    fn name(&self) -> &'static str;

    fn help_text(&self) -> &'static str;

    /// `tokens[0]` is the keyword itself. Malformed input should come back as
    /// [`Request::help_for`] rather than an error.
    fn parse(&self, tokens: &[&str]) -> Result<Request>;
}

/// Everything an executor may touch besides its own state.
pub struct ExecutionContext<'a> {
    pub chat: &'a dyn ChatProvider,
    pub registry: &'a FeatureRegistry,
}

#[async_trait]
pub trait Executor: Send + Sync {
    fn command_type(&self) -> CommandType;

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()>;
}

/// Pre-execution hook. May rewrite the command or reject it with an error.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, command: Command, chat: &dyn ChatProvider) -> Result<Command>;
}

/// A bundle of related commands registered together.
pub trait Feature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>>;

    fn executors(&self) -> Vec<Arc<dyn Executor>>;

    fn fallback_parser(&self) -> Option<Arc<dyn Parser>> {
        None
    }

    fn interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        Vec::new()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("parser for {0} is already registered")]
    DuplicateParser(String),
    #[error("executor for {0:?} is already registered")]
    DuplicateExecutor(CommandType),
    #[error("a fallback parser is already registered")]
    DuplicateFallback,
}

#[derive(Default)]
pub struct FeatureRegistry {
    parsers: HashMap<&'static str, Arc<dyn Parser>>,
    executors: HashMap<CommandType, Arc<dyn Executor>>,
    fallback: Option<Arc<dyn Parser>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every component of `feature`. Nothing is added if any of them conflicts.
    pub fn register(&mut self, feature: &dyn Feature) -> Result<(), RegistryError> {
        let parsers = feature.parsers();
        let executors = feature.executors();
        let fallback = feature.fallback_parser();

        let mut seen_names = Vec::new();
        for parser in &parsers {
            let name = parser.name();
            if self.parsers.contains_key(name) || seen_names.contains(&name) {
                return Err(RegistryError::DuplicateParser(name.to_string()));
            }
            seen_names.push(name);
        }

        let mut seen_types = Vec::new();
        for executor in &executors {
            let ty = executor.command_type();
            if self.executors.contains_key(&ty) || seen_types.contains(&ty) {
                return Err(RegistryError::DuplicateExecutor(ty));
            }
            seen_types.push(ty);
        }

        if fallback.is_some() && self.fallback.is_some() {
            return Err(RegistryError::DuplicateFallback);
        }

        for parser in parsers {
            self.parsers.insert(parser.name(), parser);
        }
        for executor in executors {
            self.executors.insert(executor.command_type(), executor);
        }
        if fallback.is_some() {
            self.fallback = fallback;
        }
        self.interceptors.extend(feature.interceptors());
        Ok(())
    }

    pub fn parser_by_name(&self, name: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers.get(name)
    }

    pub fn executor_by_type(&self, ty: CommandType) -> Option<&Arc<dyn Executor>> {
        self.executors.get(&ty)
    }

    pub fn fallback_parser(&self) -> Option<&Arc<dyn Parser>> {
        self.fallback.as_ref()
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }
}
