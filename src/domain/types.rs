//! # Domain Types
//!
//! The command model shared by every layer: who sent a message, where it came from,
//! and what the bot was asked to do.

use std::fmt;

/// Opaque user identity as handed to us by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub String);

/// Opaque destination identifier (a Matrix room id in production).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type tag of a [`Request`]. Executors are registered against these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    None,
    Unrecognized,
    Help,
    Learn,
    Unlearn,
    Custom,
    List,
    RickListInfo,
    RickRoll,
    Vote,
    Ballot,
    VoteStatus,
    VoteExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpData {
    /// Keyword (sigil included) the user asked about, if any.
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnData {
    pub call: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlearnData {
    pub call: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomData {
    pub call: String,
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteData {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallotData {
    pub in_favor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryData {
    pub vote_id: u64,
}

/// What the user (or a timer) asked for, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Not addressed to the bot at all.
    None,
    /// Addressed to the bot, but no builtin or custom command matched.
    Unrecognized,
    Help(HelpData),
    Learn(LearnData),
    Unlearn(UnlearnData),
    Custom(CustomData),
    List,
    RickListInfo,
    RickRoll,
    Vote(VoteData),
    Ballot(BallotData),
    VoteStatus,
    /// Posted by a vote timer, never parsed from chat.
    VoteExpired(ExpiryData),
}

impl Request {
    pub fn command_type(&self) -> CommandType {
        match self {
            Request::None => CommandType::None,
            Request::Unrecognized => CommandType::Unrecognized,
            Request::Help(_) => CommandType::Help,
            Request::Learn(_) => CommandType::Learn,
            Request::Unlearn(_) => CommandType::Unlearn,
            Request::Custom(_) => CommandType::Custom,
            Request::List => CommandType::List,
            Request::RickListInfo => CommandType::RickListInfo,
            Request::RickRoll => CommandType::RickRoll,
            Request::Vote(_) => CommandType::Vote,
            Request::Ballot(_) => CommandType::Ballot,
            Request::VoteStatus => CommandType::VoteStatus,
            Request::VoteExpired(_) => CommandType::VoteExpired,
        }
    }

    /// Help request pointing at a specific keyword's usage.
    pub fn help_for(keyword: &str) -> Self {
        Request::Help(HelpData {
            command: Some(keyword.to_string()),
        })
    }
}

/// A parsed request stamped with its origin. Immutable once queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub author: UserId,
    pub channel: ChannelId,
    pub request: Request,
}

impl Command {
    pub fn new(author: UserId, channel: ChannelId, request: Request) -> Self {
        Self {
            author,
            channel,
            request,
        }
    }

    pub fn command_type(&self) -> CommandType {
        self.request.command_type()
    }
}
