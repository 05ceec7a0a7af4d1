//! # Vote State Machine
//!
//! Per-channel vote lifecycle:
//!
//! ```text
//! NoActiveVote --start--> VoteActive --ballot (quorum)--> Resolved(Passed | Failing)
//!                              |
//!                              +--------expire(id)------> Expired
//! ```
//!
//! A channel holds at most one active vote. Every vote gets a fresh id so an expiry
//! posted by an old vote's timer can never clear a newer vote.
//! The book is only mutated from the dispatch loop; the lock exists so read-only
//! callers elsewhere see a consistent snapshot.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::types::{ChannelId, UserId};
use crate::strings::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Passed,
    Failing,
    /// Quorum not reached yet.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: u64,
    pub owner: UserId,
    pub message: String,
    pub votes_for: BTreeSet<UserId>,
    pub votes_against: BTreeSet<UserId>,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
}

impl Vote {
    /// Records `user`'s choice, replacing any earlier one.
    pub fn cast(&mut self, user: &UserId, in_favor: bool) {
        let (add, remove) = if in_favor {
            (&mut self.votes_for, &mut self.votes_against)
        } else {
            (&mut self.votes_against, &mut self.votes_for)
        };
        remove.remove(user);
        add.insert(user.clone());
    }

    pub fn outcome(&self, quorum: usize) -> VoteOutcome {
        if self.votes_for.len() >= quorum {
            VoteOutcome::Passed
        } else if self.votes_against.len() >= quorum {
            VoteOutcome::Failing
        } else {
            VoteOutcome::Pending
        }
    }

    /// Time left, floored to whole seconds and never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let total = self.duration.as_secs() as i64;
        let elapsed = (now - self.start_time).num_milliseconds();
        // Round elapsed up to the next second so the remaining time is floored.
        let elapsed_secs = (elapsed + 999).div_euclid(1000);
        Duration::from_secs((total - elapsed_secs).max(0) as u64)
    }
}

/// `"Vote is passing. 5 votes for, 0 votes against"`
pub fn status_line(vote: &Vote, quorum: usize) -> String {
    let status = match vote.outcome(quorum) {
        VoteOutcome::Passed => messages::STATUS_PASSING.to_string(),
        VoteOutcome::Failing => messages::STATUS_FAILING.to_string(),
        VoteOutcome::Pending => messages::votes_needed(quorum),
    };
    format!(
        "{}. {}, {}",
        status,
        messages::votes_for(vote.votes_for.len()),
        messages::votes_against(vote.votes_against.len())
    )
}

/// Minutes when at least a minute is left, seconds otherwise.
pub fn remaining_line(vote: &Vote, now: DateTime<Utc>) -> String {
    let secs = vote.remaining(now).as_secs() as i64;
    if secs >= 60 {
        messages::minutes_remaining(secs / 60)
    } else {
        messages::seconds_remaining(secs)
    }
}

/// Full multi-line status block for `?votestatus` and new votes.
pub fn render_status(vote: &Vote, owner_name: &str, now: DateTime<Utc>, quorum: usize) -> String {
    [
        messages::vote_owner(owner_name, &vote.message),
        messages::SPACER.to_string(),
        remaining_line(vote, now),
        status_line(vote, quorum),
    ]
    .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartResult {
    Started(Vote),
    /// Nothing changed; carries the vote that is still running.
    AlreadyActive(Vote),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallotResult {
    NoActiveVote,
    /// The ballot was counted. When `outcome` is not `Pending` the vote has left the
    /// active slot.
    Counted { vote: Vote, outcome: VoteOutcome },
}

#[derive(Debug, Default)]
struct Slots {
    next_id: u64,
    active: HashMap<ChannelId, Vote>,
}

/// All votes of the process, keyed by channel.
#[derive(Debug)]
pub struct VoteBook {
    quorum: usize,
    slots: Mutex<Slots>,
}

impl VoteBook {
    pub fn new(quorum: usize) -> Self {
        Self {
            quorum,
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub async fn start(
        &self,
        channel: &ChannelId,
        owner: &UserId,
        message: &str,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> StartResult {
        let mut slots = self.slots.lock().await;
        if let Some(existing) = slots.active.get(channel) {
            return StartResult::AlreadyActive(existing.clone());
        }
        slots.next_id += 1;
        let vote = Vote {
            id: slots.next_id,
            owner: owner.clone(),
            message: message.to_string(),
            votes_for: BTreeSet::new(),
            votes_against: BTreeSet::new(),
            start_time: now,
            duration,
        };
        slots.active.insert(channel.clone(), vote.clone());
        tracing::info!("Vote {} started in {} by {}", vote.id, channel, owner);
        StartResult::Started(vote)
    }

    pub async fn cast_ballot(
        &self,
        channel: &ChannelId,
        user: &UserId,
        in_favor: bool,
    ) -> BallotResult {
        let mut slots = self.slots.lock().await;
        let Some(vote) = slots.active.get_mut(channel) else {
            return BallotResult::NoActiveVote;
        };
        vote.cast(user, in_favor);
        let outcome = vote.outcome(self.quorum);
        let snapshot = vote.clone();

        if outcome != VoteOutcome::Pending {
            slots.active.remove(channel);
            tracing::info!("Vote {} in {} resolved: {:?}", snapshot.id, channel, outcome);
        }
        BallotResult::Counted {
            vote: snapshot,
            outcome,
        }
    }

    /// Clears the channel's vote if it is still the one with `vote_id`.
    /// Returns `None` (and changes nothing) for stale expiries.
    pub async fn expire(&self, channel: &ChannelId, vote_id: u64) -> Option<Vote> {
        let mut slots = self.slots.lock().await;
        if slots.active.get(channel).map(|v| v.id) != Some(vote_id) {
            tracing::debug!("Ignoring stale expiry for vote {} in {}", vote_id, channel);
            return None;
        }
        let vote = slots.active.remove(channel)?;
        tracing::info!("Vote {} in {} expired", vote.id, channel);
        Some(vote)
    }

    pub async fn active(&self, channel: &ChannelId) -> Option<Vote> {
        self.slots.lock().await.active.get(channel).cloned()
    }
}
