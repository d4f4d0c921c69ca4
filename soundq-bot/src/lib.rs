//! # SoundQ Bot Library (soundq-bot)
//!
//! The `sound` chat command: resolve what the user asked for, apply the
//! duration limit, queue the result and, when a track arrives with a
//! playlist attached, ask before loading the rest.
//!
//! **Architecture:** resolver backends, the playback queue and the chat
//! transport are traits; the command pipeline only talks to them through
//! `ResolverBackend`, `QueueService` and `Transport`.

pub mod command;
pub mod config;
pub mod confirm;
pub mod dispatch;
pub mod error;
pub mod library;
pub mod policy;
pub mod queue;
pub mod report;
pub mod resolver;
pub mod track;
pub mod transport;

pub use command::{CommandReport, ExpansionReport, FailureKind, Invocation, SoundCommand};
pub use error::{Error, Result};
