//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes parsing, the feature registry, the dispatch loop, the keyed stores and
//! the vote state machine.

pub mod dispatch;
pub mod parsing;
pub mod registry;
pub mod router;
pub mod store;
pub mod vote;
