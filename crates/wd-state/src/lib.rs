//! wd-state: Editor state, actions and the reducer
//!
//! Provides the single source of truth for the editing surface:
//! - Immutable-update reducer over a closed set of actions
//! - Split and ripple cut engine
//! - Selection/focus normalization
//! - Clipboard layout for copy/cut/paste

mod action;
mod clipboard;
pub mod cut;
mod reducer;
pub mod selection;
mod state;
mod store;

pub use action::*;
pub use clipboard::*;
pub use cut::{apply_cut, apply_ripple_cut, apply_split_cut};
pub use reducer::reduce;
pub use selection::{normalize_selection, track_click_selection, SelectionDriver, TrackSelectMode};
pub use state::*;
pub use store::*;
