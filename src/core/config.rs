/// Playback configuration, loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::schema::dialog::DialogId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("auto-continue is enabled but its delay is zero")]
    ZeroDelay,
}

/// Knobs for one playback session. Every field has a default, so a config
/// file only needs to name what it changes:
///
/// ```ron
/// (
///     auto_continue_delay_ms: 800,
///     player_speaker: "Traveller",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub auto_continue: bool,
    pub auto_continue_delay_ms: u64,
    pub player_speaker: String,
    pub start_dialog: Option<DialogId>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_continue: true,
            auto_continue_delay_ms: 1500,
            player_speaker: "Player".to_string(),
            start_dialog: None,
        }
    }
}

impl PlaybackConfig {
    pub fn load_from_ron(path: &Path) -> Result<PlaybackConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<PlaybackConfig, ConfigError> {
        let config: PlaybackConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// A zero delay would let a cycle of auto-continuing dialogs spin
    /// forever inside a single `advance`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_continue && self.auto_continue_delay_ms == 0 {
            return Err(ConfigError::ZeroDelay);
        }
        Ok(())
    }

    pub fn auto_continue_delay(&self) -> Duration {
        Duration::from_millis(self.auto_continue_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ron_gives_defaults() {
        let config = PlaybackConfig::parse_ron("()").unwrap();
        assert_eq!(config, PlaybackConfig::default());
        assert_eq!(config.auto_continue_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_override() {
        let config = PlaybackConfig::parse_ron(
            r#"(auto_continue_delay_ms: 250, player_speaker: "Traveller", start_dialog: Some(4))"#,
        )
        .unwrap();
        assert!(config.auto_continue);
        assert_eq!(config.auto_continue_delay_ms, 250);
        assert_eq!(config.player_speaker, "Traveller");
        assert_eq!(config.start_dialog, Some(DialogId(4)));
    }

    #[test]
    fn zero_delay_rejected_only_when_enabled() {
        assert!(matches!(
            PlaybackConfig::parse_ron("(auto_continue_delay_ms: 0)"),
            Err(ConfigError::ZeroDelay)
        ));
        assert!(PlaybackConfig::parse_ron("(auto_continue: false, auto_continue_delay_ms: 0)").is_ok());
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(matches!(
            PlaybackConfig::parse_ron("(auto_continue: maybe)"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn load_fixture() {
        let path = std::path::PathBuf::from("tests/fixtures/playback.ron");
        let config = PlaybackConfig::load_from_ron(&path).unwrap();
        assert_eq!(config.auto_continue_delay_ms, 800);
        assert_eq!(config.player_speaker, "Traveller");
    }
}
