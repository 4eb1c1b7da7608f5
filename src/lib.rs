//! jellywatch - Discord notifications for Jellyfin playback and new media
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod integrations;
pub mod status;
pub mod util;
pub mod watch;
