//! # SoundQ Common Library
//!
//! Shared code for the SoundQ crates including:
//! - Error types
//! - TOML bootstrap configuration and sounds folder resolution
//! - Telemetry event types (SoundEvent enum) and the EventBus
//! - Track time formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;

pub use error::{Error, Result};
