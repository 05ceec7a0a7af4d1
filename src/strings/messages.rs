//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Vote status phrasing lives here so the status, ballot and expiry executors agree on it.

// Learn / Unlearn
pub fn learned(call: &str) -> String {
    format!("Learned about ?{call}")
}

pub fn already_known(call: &str) -> String {
    format!("I already know ?{call}")
}

pub fn forgot(call: &str) -> String {
    format!("Forgot about ?{call}")
}

pub fn cannot_unlearn_builtin(call: &str) -> String {
    format!("I can't unlearn builtin ?{call}")
}

pub fn unknown_call(call: &str) -> String {
    format!("I don't know ?{call}")
}

// List
pub const NO_CUSTOM_COMMANDS: &str = "No custom commands have been learned yet";
pub const LIST_UPLOAD_FAILED: &str = "Unable to upload the command list";
pub const LIST_DESCRIPTION: &str = "Learned commands";

pub fn list_uploaded(url: &str) -> String {
    format!("The full list of learned commands is at {url}")
}

pub fn list_line(call: &str, response: &str) -> String {
    format!("?{call}: {response}")
}

// Moderation
pub const RICK_ROLL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const RICK_LIST_INFO: &str =
    "Custom commands typed by people on the rick list are answered with a rick roll instead.";
pub const RICK_LIST_EMPTY: &str = "Nobody is on the rick list.";

pub fn rick_list_members(names: &[String]) -> String {
    format!("On the rick list: {}", names.join(", "))
}

// Votes
pub const NO_ACTIVE_VOTE: &str = "No active vote";
pub const VOTE_ALREADY_ACTIVE: &str = "A vote is already active in this channel";
pub const SPACER: &str = "-----";
pub const STATUS_PASSING: &str = "Vote is passing";
pub const STATUS_FAILING: &str = "Vote is failing";
pub const ONE_VOTE_FOR: &str = "1 vote for";
pub const ONE_VOTE_AGAINST: &str = "1 vote against";

pub fn votes_needed(quorum: usize) -> String {
    format!("{quorum} votes for or {quorum} votes against needed")
}

pub fn votes_for(count: usize) -> String {
    if count == 1 {
        ONE_VOTE_FOR.to_string()
    } else {
        format!("{count} votes for")
    }
}

pub fn votes_against(count: usize) -> String {
    if count == 1 {
        ONE_VOTE_AGAINST.to_string()
    } else {
        format!("{count} votes against")
    }
}

pub fn vote_owner(owner: &str, message: &str) -> String {
    format!("Vote started by {owner}: {message}")
}

pub fn minutes_remaining(minutes: i64) -> String {
    format!("{minutes} minutes remaining")
}

pub fn seconds_remaining(seconds: i64) -> String {
    format!("{seconds} seconds remaining")
}

pub fn vote_resolved(message: &str, status_line: &str) -> String {
    format!("Vote finished: {message}\n{status_line}")
}

pub fn vote_expired(message: &str, status_line: &str) -> String {
    format!("Vote expired: {message}\n{status_line}")
}
