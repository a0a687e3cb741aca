use serde::{Deserialize, Serialize};

use super::dialog::{Dialog, DialogId};

/// An ordered run of dialogs under one NPC/label context.
///
/// Scenes have no identity beyond their position in the graph and their
/// label; dialogs are addressed by `DialogId` across all scenes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(rename = "NPCName", default)]
    pub npc_name: String,
    #[serde(rename = "NPCState", default)]
    pub npc_state: String,
    #[serde(rename = "PlayerState", default)]
    pub player_state: String,
    #[serde(rename = "Label", default)]
    pub label: String,
    #[serde(rename = "Dialogs", default)]
    pub dialogs: Vec<Dialog>,
}

impl Scene {
    pub fn first_dialog_id(&self) -> Option<DialogId> {
        self.dialogs.first().map(|d| d.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_field_order_matches_export() {
        let scene = Scene {
            npc_name: "Olaf".to_string(),
            label: "Gate".to_string(),
            ..Scene::default()
        };
        let json = serde_json::to_string(&scene).unwrap();
        assert_eq!(
            json,
            r#"{"NPCName":"Olaf","NPCState":"","PlayerState":"","Label":"Gate","Dialogs":[]}"#
        );
    }

    #[test]
    fn first_dialog_id_of_empty_scene() {
        assert_eq!(Scene::default().first_dialog_id(), None);
    }
}
