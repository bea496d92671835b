//! # lumen-types
//!
//! Shared type definitions for the lumen lighting daemon.
//! This crate holds the light color model and the render channel slots that
//! lumen-net arbitrates over. Nothing here performs I/O.

mod channel;
mod clock;
pub mod light;

pub use channel::Channel;
pub use clock::now_micros;
pub use light::{Color, Light, ScanRange};

/// Index of a light in the configured light list.
pub type LightIndex = usize;

/// Index of a color output within one light.
pub type ColorIndex = usize;
