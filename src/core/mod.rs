//! Playback runtime: the graph index, the traversal engine and its helpers.

pub mod config;
pub mod engine;
pub mod graph;
pub mod history;
pub mod lint;
pub mod timer;
pub mod walk;
