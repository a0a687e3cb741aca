//! Authored data: scenes, dialogs, options and their presentation annotations.

pub mod dialog;
pub mod scene;
