//! Dialog Engine — playback of branching NPC dialog graphs.
//!
//! Loads scene/dialog graphs exported by the authoring tool, walks them one
//! line or player choice at a time, keeps a replayable history, and
//! advances option-less lines automatically after a fixed delay.

pub mod core;
pub mod schema;

pub use crate::core::config::PlaybackConfig;
pub use crate::core::engine::{DialogEngine, EngineError, InvalidTransition, VisibleState};
pub use crate::core::graph::{DialogGraph, GraphError};
pub use crate::core::history::{HistoryEntry, HistoryLog};
pub use crate::schema::dialog::{Dialog, DialogId, DialogOption};
pub use crate::schema::scene::Scene;
