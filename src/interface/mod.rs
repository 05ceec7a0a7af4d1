//! # Interface Layer
//!
//! User-facing command features plugged into the registry.

pub mod commands;
