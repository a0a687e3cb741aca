use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for dialog IDs.
///
/// IDs are authored by hand and are expected to be unique across every
/// scene of a graph, not just within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogId(pub i64);

impl DialogId {
    /// The id the fallback-increment policy routes to when a dialog or
    /// option carries no explicit target. `None` on overflow.
    pub fn successor(self) -> Option<DialogId> {
        self.0.checked_add(1).map(DialogId)
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a line (or a character portrait) is placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Position {
    Left,
    #[default]
    Center,
    Right,
}

/// Portrait variant shown next to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DialogImage {
    #[default]
    Common,
    Thinking,
    Overthinking,
    Surprising,
}

/// Animation a character plays while a dialog is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Animation {
    #[default]
    Idle,
    Shaking,
    Zooming,
    Running,
}

/// A player-selectable choice. A missing `NextDialog` falls back to the
/// owning dialog's id + 1.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogOption {
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "NextDialog", default)]
    pub next_dialog: Option<DialogId>,
}

/// A character shown on stage during a dialog. Presentation only; the
/// traversal engine never reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Character {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Animation", default)]
    pub animation: Animation,
    #[serde(rename = "Position", default = "Character::default_position")]
    pub position: Position,
    #[serde(rename = "Image", default)]
    pub image: String,
}

impl Character {
    fn default_position() -> Position {
        Position::Left
    }
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: String::new(),
            animation: Animation::Idle,
            position: Self::default_position(),
            image: String::new(),
        }
    }
}

/// A state change applied to a named character when the dialog ends.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndState {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "State", default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndDialog {
    #[serde(rename = "NextState", default)]
    pub next_state: Vec<EndState>,
}

/// One authored line of speech plus its routing metadata.
///
/// Field order matches the authoring tool's export so that a parsed file
/// serializes back to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dialog {
    #[serde(rename = "DialogId")]
    pub id: DialogId,
    #[serde(rename = "Speaker", default)]
    pub speaker: String,
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Position", default)]
    pub position: Position,
    #[serde(rename = "DialogImage", default)]
    pub image: DialogImage,
    #[serde(rename = "NextDialogId", default)]
    pub next_dialog_id: Option<DialogId>,
    #[serde(rename = "Options", default)]
    pub options: Vec<DialogOption>,
    #[serde(rename = "Characters", default)]
    pub characters: Vec<Character>,
    #[serde(rename = "EndDialog", default)]
    pub end_dialog: EndDialog,
}

impl Dialog {
    /// A blank dialog as the authoring tool creates it.
    pub fn new(id: DialogId) -> Self {
        Self {
            id,
            speaker: String::new(),
            text: String::new(),
            position: Position::Center,
            image: DialogImage::Common,
            next_dialog_id: None,
            options: Vec::new(),
            characters: Vec::new(),
            end_dialog: EndDialog::default(),
        }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Where `continue` leads from this dialog.
    pub fn continue_target(&self) -> Option<DialogId> {
        self.next_dialog_id.or_else(|| self.id.successor())
    }

    /// Where selecting option `index` leads. `None` if the index is out of
    /// range or the fallback id overflows.
    pub fn option_target(&self, index: usize) -> Option<DialogId> {
        let option = self.options.get(index)?;
        option.next_dialog.or_else(|| self.id.successor())
    }

    /// Auto-continue only applies to option-less dialogs with explicit routing.
    pub fn auto_continues(&self) -> bool {
        self.options.is_empty() && self.next_dialog_id.is_some()
    }
}
