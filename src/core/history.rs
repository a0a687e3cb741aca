/// History log — the lines a playthrough has shown so far.

use serde::{Deserialize, Serialize};

use crate::schema::dialog::{Dialog, Position};

/// A resolved line as it was shown. Copied out of the graph so that later
/// edits to the authored dialog cannot change what the log displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: String,
    pub text: String,
    pub position: Position,
}

impl HistoryEntry {
    /// The dialog's own line.
    pub fn from_dialog(dialog: &Dialog) -> Self {
        Self {
            speaker: dialog.speaker.clone(),
            text: dialog.text.clone(),
            position: dialog.position,
        }
    }

    /// A chosen option, shown right-aligned under the player's name.
    pub fn player_choice(speaker: &str, text: &str) -> Self {
        Self {
            speaker: speaker.to_string(),
            text: text.to_string(),
            position: Position::Right,
        }
    }
}

/// Append-only during a session; only a restart clears it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::dialog::DialogId;

    #[test]
    fn entry_is_decoupled_from_dialog() {
        let mut dialog = Dialog::new(DialogId(1));
        dialog.speaker = "Olaf".to_string();
        dialog.text = "Cold out.".to_string();
        dialog.position = Position::Left;

        let entry = HistoryEntry::from_dialog(&dialog);
        dialog.text = "Edited afterwards.".to_string();

        assert_eq!(entry.text, "Cold out.");
        assert_eq!(entry.position, Position::Left);
    }

    #[test]
    fn player_choice_is_right_aligned() {
        let entry = HistoryEntry::player_choice("Player", "Yes");
        assert_eq!(entry.speaker, "Player");
        assert_eq!(entry.position, Position::Right);
    }

    #[test]
    fn log_appends_in_order_and_clears() {
        let mut log = HistoryLog::new();
        log.push(HistoryEntry::player_choice("Player", "a"));
        log.push(HistoryEntry::player_choice("Player", "b"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().text, "b");
        let texts: Vec<&str> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["a", "b"]);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn log_serializes_as_array() {
        let mut log = HistoryLog::new();
        log.push(HistoryEntry::player_choice("Player", "Yes"));
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(
            json,
            r#"[{"speaker":"Player","text":"Yes","position":"Right"}]"#
        );
    }
}
