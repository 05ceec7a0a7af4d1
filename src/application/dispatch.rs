//! # Dispatch Loop
//!
//! The single consumer of the command queue. Every state change in the bot happens here,
//! one command at a time, in queue order: user commands and timer-posted expiries alike.
//! A failing interceptor or executor only costs the command that triggered it.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::registry::{ExecutionContext, FeatureRegistry};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Command;

pub type CommandSender = mpsc::Sender<Command>;
pub type CommandReceiver = mpsc::Receiver<Command>;

pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    mpsc::channel(capacity.max(1))
}

pub struct Dispatcher {
    registry: Arc<FeatureRegistry>,
    chat: Arc<dyn ChatProvider>,
    executor_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<FeatureRegistry>,
        chat: Arc<dyn ChatProvider>,
        executor_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            chat,
            executor_timeout,
        }
    }

    /// Drains the queue until every sender is gone.
    pub async fn run(self, mut commands: CommandReceiver) {
        tracing::info!("Dispatch loop started");
        while let Some(command) = commands.recv().await {
            let ty = command.command_type();
            let channel = command.channel.clone();
            if let Err(e) = self.dispatch(command).await {
                tracing::error!("Failed to execute {:?} in {}: {:#}", ty, channel, e);
            }
        }
        tracing::info!("Dispatch loop stopped: command queue closed");
    }

    /// Runs interceptors, then the matching executor. Commands without an executor are
    /// dropped silently.
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        let mut command = command;
        for interceptor in self.registry.interceptors() {
            command = interceptor
                .intercept(command, self.chat.as_ref())
                .await
                .context("interceptor rejected command")?;
        }

        let Some(executor) = self.registry.executor_by_type(command.command_type()) else {
            tracing::debug!("No executor for {:?}, dropping", command.command_type());
            return Ok(());
        };

        let ctx = ExecutionContext {
            chat: self.chat.as_ref(),
            registry: self.registry.as_ref(),
        };
        tokio::time::timeout(self.executor_timeout, executor.execute(&ctx, &command))
            .await
            .with_context(|| {
                format!(
                    "{:?} executor timed out after {:?}",
                    command.command_type(),
                    self.executor_timeout
                )
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::{Executor, Feature, Interceptor, Parser};
    use crate::domain::types::{ChannelId, CommandType, Request, UserId};
    use crate::testutil::FakeChat;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Records the order in which commands reach it.
    struct Recorder {
        seen: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl Executor for Recorder {
        fn command_type(&self) -> CommandType {
            CommandType::Vote
        }

        async fn execute(&self, _ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
            let Request::Vote(data) = &command.request else {
                return Ok(());
            };
            self.seen.lock().unwrap().push(data.message.clone());
            if data.message == "fail" {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    struct Slow;

    #[async_trait]
    impl Executor for Slow {
        fn command_type(&self) -> CommandType {
            CommandType::List
        }

        async fn execute(&self, _ctx: &ExecutionContext<'_>, _command: &Command) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    /// Rejects anything sent by `@banned`.
    struct Gate;

    #[async_trait]
    impl Interceptor for Gate {
        async fn intercept(&self, command: Command, _chat: &dyn ChatProvider) -> Result<Command> {
            if command.author.as_str() == "@banned" {
                anyhow::bail!("banned");
            }
            Ok(command)
        }
    }

    struct TestFeature {
        seen: Arc<StdMutex<Vec<String>>>,
    }

    impl Feature for TestFeature {
        fn parsers(&self) -> Vec<Arc<dyn Parser>> {
            Vec::new()
        }

        fn executors(&self) -> Vec<Arc<dyn Executor>> {
            vec![
                Arc::new(Recorder {
                    seen: self.seen.clone(),
                }) as Arc<dyn Executor>,
                Arc::new(Slow) as Arc<dyn Executor>,
            ]
        }

        fn interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
            vec![Arc::new(Gate) as Arc<dyn Interceptor>]
        }
    }

    fn vote(author: &str, message: &str) -> Command {
        Command::new(
            UserId::new(author),
            ChannelId::new("!room"),
            Request::Vote(crate::domain::types::VoteData {
                message: message.to_string(),
            }),
        )
    }

    fn dispatcher(seen: Arc<StdMutex<Vec<String>>>, timeout: Duration) -> Dispatcher {
        let mut registry = FeatureRegistry::new();
        registry.register(&TestFeature { seen }).unwrap();
        Dispatcher::new(Arc::new(registry), Arc::new(FakeChat::new()), timeout)
    }

    #[tokio::test]
    async fn test_loop_preserves_order_and_survives_failures() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let dispatcher = dispatcher(seen.clone(), Duration::from_secs(5));
        let (tx, rx) = command_queue(8);

        tx.send(vote("@a", "one")).await.unwrap();
        tx.send(vote("@a", "fail")).await.unwrap();
        tx.send(vote("@banned", "rejected")).await.unwrap();
        tx.send(vote("@b", "two")).await.unwrap();
        drop(tx);

        dispatcher.run(rx).await;
        assert_eq!(*seen.lock().unwrap(), vec!["one", "fail", "two"]);
    }

    #[tokio::test]
    async fn test_interceptor_error_skips_execution() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let dispatcher = dispatcher(seen.clone(), Duration::from_secs(5));
        assert!(dispatcher.dispatch(vote("@banned", "x")).await.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_type_is_silently_dropped() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let dispatcher = dispatcher(seen, Duration::from_secs(5));
        let command = Command::new(
            UserId::new("@a"),
            ChannelId::new("!room"),
            Request::Unrecognized,
        );
        assert!(dispatcher.dispatch(command).await.is_ok());
    }

    #[tokio::test]
    async fn test_stuck_executor_times_out() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let dispatcher = dispatcher(seen, Duration::from_millis(50));
        let command = Command::new(UserId::new("@a"), ChannelId::new("!room"), Request::List);
        let err = dispatcher.dispatch(command).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
