//! wd-core: Shared region model for WaveDesk
//!
//! Tracks, clips, labels and envelope points with their time-range
//! semantics. Every other WaveDesk crate builds on these types.

mod clip;
mod envelope;
mod error;
mod label;
mod time;
mod track;

pub use clip::*;
pub use envelope::*;
pub use error::*;
pub use label::*;
pub use time::*;
pub use track::*;
