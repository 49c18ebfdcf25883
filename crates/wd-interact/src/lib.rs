//! wd-interact: Pointer & keyboard interaction for WaveDesk
//!
//! Turns canvas pointer events and key chords into editor actions:
//! - Hit testing against the timeline layout
//! - Gesture controllers (clip drag/trim, label drag, envelope, time range)
//! - Keyboard commands with a persistent clipboard
//! - Transport and recording bridge to external engines
//! - Editor session wiring it all to the store

mod canvas;
mod clip_drag;
mod clip_trim;
mod config;
mod envelope_edit;
mod geometry;
mod gesture;
mod keyboard;
mod label_drag;
mod listener;
mod session;
mod time_select;
mod transport;

pub use canvas::*;
pub use clip_drag::*;
pub use clip_trim::*;
pub use config::*;
pub use envelope_edit::*;
pub use geometry::*;
pub use gesture::*;
pub use keyboard::*;
pub use label_drag::*;
pub use listener::*;
pub use session::*;
pub use time_select::*;
pub use transport::*;
