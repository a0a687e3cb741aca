/// Dialog graph — the scene list plus an id index for traversal.

use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;

use crate::schema::dialog::{Dialog, DialogId};
use crate::schema::scene::Scene;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Position of a dialog inside the scene list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub scene: usize,
    pub dialog: usize,
}

/// An id that appears more than once. The first occurrence in scan order
/// is the one the index resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: DialogId,
    pub first: Location,
    pub duplicate: Location,
}

/// A read-only snapshot of authored scenes, indexed by `DialogId`.
///
/// Routing between dialogs is by id lookup only, so cycles and dangling
/// references need no special handling here.
#[derive(Debug, Clone, Default)]
pub struct DialogGraph {
    scenes: Vec<Scene>,
    index: FxHashMap<DialogId, Location>,
    duplicates: Vec<DuplicateId>,
}

impl DialogGraph {
    pub fn new(scenes: Vec<Scene>) -> Self {
        let mut index = FxHashMap::default();
        let mut duplicates = Vec::new();

        for (scene_idx, scene) in scenes.iter().enumerate() {
            for (dialog_idx, dialog) in scene.dialogs.iter().enumerate() {
                let here = Location {
                    scene: scene_idx,
                    dialog: dialog_idx,
                };
                match index.get(&dialog.id) {
                    Some(&first) => {
                        tracing::warn!(
                            id = dialog.id.0,
                            scene = scene_idx,
                            dialog = dialog_idx,
                            "duplicate dialog id; keeping first occurrence"
                        );
                        duplicates.push(DuplicateId {
                            id: dialog.id,
                            first,
                            duplicate: here,
                        });
                    }
                    None => {
                        index.insert(dialog.id, here);
                    }
                }
            }
        }

        Self {
            scenes,
            index,
            duplicates,
        }
    }

    /// Load a graph from an authoring-tool JSON export.
    pub fn load_from_json(path: &Path) -> Result<DialogGraph, GraphError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_json(&contents)
    }

    /// Parse a graph from a JSON string. Fails on any structural mismatch;
    /// a partially valid graph is never returned.
    pub fn parse_json(input: &str) -> Result<DialogGraph, GraphError> {
        let scenes: Vec<Scene> = serde_json::from_str(input)?;
        Ok(Self::new(scenes))
    }

    /// Serialize in the authoring tool's export layout (two-space indent,
    /// no trailing newline).
    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.scenes)?)
    }

    pub fn save_to_json(&self, path: &Path) -> Result<(), GraphError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn into_scenes(self) -> Vec<Scene> {
        self.scenes
    }

    /// Look up a dialog by id. Absence is a normal outcome.
    pub fn resolve(&self, id: DialogId) -> Option<&Dialog> {
        let loc = self.index.get(&id)?;
        self.scenes
            .get(loc.scene)
            .and_then(|scene| scene.dialogs.get(loc.dialog))
    }

    pub fn locate(&self, id: DialogId) -> Option<Location> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: DialogId) -> bool {
        self.index.contains_key(&id)
    }

    /// The id of the first dialog of the first scene that has any.
    pub fn first_dialog_id(&self) -> Option<DialogId> {
        self.scenes.iter().find_map(Scene::first_dialog_id)
    }

    /// Every dialog in scan order, duplicates included.
    pub fn dialogs(&self) -> impl Iterator<Item = &Dialog> {
        self.scenes.iter().flat_map(|scene| scene.dialogs.iter())
    }

    pub fn dialog_count(&self) -> usize {
        self.scenes.iter().map(|scene| scene.dialogs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn duplicates(&self) -> &[DuplicateId] {
        &self.duplicates
    }

    pub fn highest_dialog_id(&self) -> Option<DialogId> {
        self.index.keys().copied().max()
    }

    /// The id the authoring tool would hand to a newly added dialog.
    pub fn next_free_dialog_id(&self) -> DialogId {
        self.highest_dialog_id()
            .and_then(DialogId::successor)
            .unwrap_or(DialogId(1))
    }
}

impl From<Vec<Scene>> for DialogGraph {
    fn from(scenes: Vec<Scene>) -> Self {
        Self::new(scenes)
    }
}
