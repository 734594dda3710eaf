//! Fable Player - Progress Synchronization
//!
//! Periodically reports listening progress to the media server, with session
//! lifecycle management and failure recovery.
//!
//! The [`SyncEngine`] listens to player events, derives the current chapter
//! and progress snapshot, and pushes updates through the
//! [`fable_core::MediaChannel`]:
//!
//! - one playback session is active at a time; it is (re)opened when the
//!   item, chapter, or session origin changes,
//! - at most one sync call is ever in flight; extra ticks are dropped,
//! - a "session not found" response reopens the session automatically,
//! - all other sync failures are logged and absorbed; the next tick
//!   resubmits the current position.
//!
//! The periodic loop runs as a cancellable background task parented to the
//! current item: switching items aborts the previous loop before the new one
//! starts, so sessions never leak across items.

#![forbid(unsafe_code)]

pub mod config;
mod engine;
mod gate;
pub mod probe;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use gate::{TickGate, TickPermit};
pub use probe::PlayerProbe;
