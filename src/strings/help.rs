//! # Help Text
//!
//! Usage strings for every builtin command.
//! Shown by `?help` and whenever a command is typed with the wrong arguments.

pub const MAIN: &str = concat!(
    "Available commands:\n",
    "?help [command]: Show help for a command\n",
    "?learn <call> <response>: Teach me a new command\n",
    "?unlearn <call>: Forget a learned command\n",
    "?list: List all learned commands\n",
    "?ricklist: Explain the rick list\n",
    "?vote <message>: Start a vote in this channel\n",
    "?yes / ?f1: Vote in favor\n",
    "?no / ?f2: Vote against\n",
    "?votestatus: Show the current vote"
);

pub const HELP: &str =
    "?help [command]: Show help for a command, or this list when no command is given.";

pub const LEARN: &str = concat!(
    "?learn <call> <response>: Teach me a new command. ",
    "Afterwards, typing ?call makes me reply with the response. ",
    "Neither the call nor the response may start with ?, ! or /, ",
    "and the call must be a single word. ",
    "Use $1 in the response to insert whatever follows the call."
);

pub const UNLEARN: &str = "?unlearn <call>: Make me forget a command you taught me with ?learn.";

pub const LIST: &str = "?list: List every command I have learned.";

pub const RICKLIST: &str = "?ricklist: Explain who is on the rick list and what it does.";

pub const VOTE: &str = concat!(
    "?vote <message>: Start a vote in this channel. ",
    "Only one vote can run per channel at a time."
);

pub const YES: &str = "?yes: Vote in favor of the active vote. ?f1 does the same.";

pub const NO: &str = "?no: Vote against the active vote. ?f2 does the same.";

pub const VOTE_STATUS: &str = "?votestatus: Show the active vote, the time left and the tally.";
