//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatProvider, Gist, Clock, Timer).

pub mod gist;
pub mod matrix;
pub mod timer;
