//! # Vote Commands
//!
//! `?vote`, `?yes`/`?f1`, `?no`/`?f2`, `?votestatus`, plus the executor for the expiry
//! commands that vote timers post back onto the queue.
//!
//! Display names are resolved before any state change so a failed lookup aborts the
//! message without touching the vote.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{mismatch, reply};
use crate::application::parsing::rest;
use crate::application::registry::{ExecutionContext, Executor, Feature, Parser};
use crate::application::vote::{self, BallotResult, StartResult, VoteBook, VoteOutcome};
use crate::domain::traits::{ChatProvider, Clock, Timer};
use crate::domain::types::{
    BallotData, ChannelId, Command, CommandType, ExpiryData, Request, UserId, VoteData,
};
use crate::strings;
use crate::strings::messages;

pub const VOTE: &str = "?vote";
pub const YES: &str = "?yes";
pub const F1: &str = "?f1";
pub const NO: &str = "?no";
pub const F2: &str = "?f2";
pub const STATUS: &str = "?votestatus";

/// State shared by every vote executor.
struct VoteShared {
    book: Arc<VoteBook>,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    duration: Duration,
}

pub struct VoteFeature {
    shared: Arc<VoteShared>,
}

impl VoteFeature {
    pub fn new(
        book: Arc<VoteBook>,
        clock: Arc<dyn Clock>,
        timer: Arc<dyn Timer>,
        duration: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(VoteShared {
                book,
                clock,
                timer,
                duration,
            }),
        }
    }
}

impl Feature for VoteFeature {
    fn parsers(&self) -> Vec<Arc<dyn Parser>> {
        vec![
            Arc::new(VoteParser),
            Arc::new(BallotParser::new(YES, true, strings::help::YES)),
            Arc::new(BallotParser::new(F1, true, strings::help::YES)),
            Arc::new(BallotParser::new(NO, false, strings::help::NO)),
            Arc::new(BallotParser::new(F2, false, strings::help::NO)),
            Arc::new(StatusParser),
        ]
    }

    fn executors(&self) -> Vec<Arc<dyn Executor>> {
        vec![
            Arc::new(StartExecutor {
                shared: self.shared.clone(),
            }),
            Arc::new(BallotExecutor {
                shared: self.shared.clone(),
            }),
            Arc::new(StatusExecutor {
                shared: self.shared.clone(),
            }),
            Arc::new(ExpiryExecutor {
                shared: self.shared.clone(),
            }),
        ]
    }
}

struct VoteParser;

impl Parser for VoteParser {
    fn name(&self) -> &'static str {
        VOTE
    }

    fn help_text(&self) -> &'static str {
        strings::help::VOTE
    }

    fn parse(&self, tokens: &[&str]) -> Result<Request> {
        let message = rest(tokens);
        if message.trim().is_empty() {
            return Ok(Request::help_for(VOTE));
        }
        Ok(Request::Vote(VoteData { message }))
    }
}

struct BallotParser {
    name: &'static str,
    in_favor: bool,
    help: &'static str,
}

impl BallotParser {
    fn new(name: &'static str, in_favor: bool, help: &'static str) -> Self {
        Self {
            name,
            in_favor,
            help,
        }
    }
}

impl Parser for BallotParser {
    fn name(&self) -> &'static str {
        self.name
    }

    fn help_text(&self) -> &'static str {
        self.help
    }

    fn parse(&self, _tokens: &[&str]) -> Result<Request> {
        Ok(Request::Ballot(BallotData {
            in_favor: self.in_favor,
        }))
    }
}

struct StatusParser;

impl Parser for StatusParser {
    fn name(&self) -> &'static str {
        STATUS
    }

    fn help_text(&self) -> &'static str {
        strings::help::VOTE_STATUS
    }

    fn parse(&self, _tokens: &[&str]) -> Result<Request> {
        Ok(Request::VoteStatus)
    }
}

async fn owner_name(
    chat: &dyn ChatProvider,
    channel: &ChannelId,
    owner: &UserId,
) -> Result<String> {
    chat.display_name(channel, owner)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to resolve vote owner {owner}"))
}

struct StartExecutor {
    shared: Arc<VoteShared>,
}

#[async_trait]
impl Executor for StartExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::Vote
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::Vote(data) = &command.request else {
            return Err(mismatch("vote", command));
        };
        let shared = &self.shared;
        if shared.book.active(&command.channel).await.is_some() {
            return reply(ctx.chat, &command.channel, messages::VOTE_ALREADY_ACTIVE).await;
        }

        let owner = owner_name(ctx.chat, &command.channel, &command.author).await?;
        let now = shared.clock.now();
        let vote = match shared
            .book
            .start(&command.channel, &command.author, &data.message, now, shared.duration)
            .await
        {
            StartResult::Started(vote) => vote,
            StartResult::AlreadyActive(_) => {
                return reply(ctx.chat, &command.channel, messages::VOTE_ALREADY_ACTIVE).await;
            }
        };

        shared.timer.schedule(
            shared.duration,
            Command::new(
                command.author.clone(),
                command.channel.clone(),
                Request::VoteExpired(ExpiryData { vote_id: vote.id }),
            ),
        );

        let status = vote::render_status(&vote, &owner, now, shared.book.quorum());
        reply(ctx.chat, &command.channel, &status).await
    }
}

struct BallotExecutor {
    shared: Arc<VoteShared>,
}

#[async_trait]
impl Executor for BallotExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::Ballot
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::Ballot(data) = &command.request else {
            return Err(mismatch("ballot", command));
        };
        let quorum = self.shared.book.quorum();
        let text = match self
            .shared
            .book
            .cast_ballot(&command.channel, &command.author, data.in_favor)
            .await
        {
            BallotResult::NoActiveVote => messages::NO_ACTIVE_VOTE.to_string(),
            BallotResult::Counted {
                vote,
                outcome: VoteOutcome::Pending,
            } => vote::status_line(&vote, quorum),
            BallotResult::Counted { vote, .. } => {
                messages::vote_resolved(&vote.message, &vote::status_line(&vote, quorum))
            }
        };
        reply(ctx.chat, &command.channel, &text).await
    }
}

struct StatusExecutor {
    shared: Arc<VoteShared>,
}

#[async_trait]
impl Executor for StatusExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::VoteStatus
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Some(vote) = self.shared.book.active(&command.channel).await else {
            return reply(ctx.chat, &command.channel, messages::NO_ACTIVE_VOTE).await;
        };
        let owner = owner_name(ctx.chat, &command.channel, &vote.owner).await?;
        let status = vote::render_status(
            &vote,
            &owner,
            self.shared.clock.now(),
            self.shared.book.quorum(),
        );
        reply(ctx.chat, &command.channel, &status).await
    }
}

struct ExpiryExecutor {
    shared: Arc<VoteShared>,
}

#[async_trait]
impl Executor for ExpiryExecutor {
    fn command_type(&self) -> CommandType {
        CommandType::VoteExpired
    }

    async fn execute(&self, ctx: &ExecutionContext<'_>, command: &Command) -> Result<()> {
        let Request::VoteExpired(data) = &command.request else {
            return Err(mismatch("vote expiry", command));
        };
        let Some(vote) = self.shared.book.expire(&command.channel, data.vote_id).await else {
            return Ok(());
        };
        let line = vote::status_line(&vote, self.shared.book.quorum());
        reply(ctx.chat, &command.channel, &messages::vote_expired(&vote.message, &line)).await
    }
}

#[cfg(test)]
impl VoteFeature {
    pub fn for_tests() -> Self {
        use crate::testutil::{FakeClock, ManualTimer};
        Self::new(
            Arc::new(VoteBook::new(5)),
            Arc::new(FakeClock::new()),
            Arc::new(ManualTimer::new()),
            Duration::from_secs(300),
        )
    }
}
