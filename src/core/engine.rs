/// The traversal engine: current position, transitions, history and the
/// auto-continue timer for one playback session.

use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::{ConfigError, PlaybackConfig};
use crate::core::graph::{DialogGraph, GraphError};
use crate::core::history::{HistoryEntry, HistoryLog};
use crate::core::timer::{AutoContinue, AutoContinueTimer};
use crate::schema::dialog::{Dialog, DialogId, DialogOption};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// A transition that does not fit the current node. The engine state is
/// left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("no dialog to act on (current id: {})", describe_id(.dialog_id))]
    Terminal { dialog_id: Option<DialogId> },
    #[error("dialog {dialog_id} has {available} options; index {index} is out of range")]
    OptionOutOfRange {
        dialog_id: DialogId,
        index: usize,
        available: usize,
    },
    #[error("dialog {dialog_id} has {options} options; select one instead of continuing")]
    OptionsPending { dialog_id: DialogId, options: usize },
}

fn describe_id(id: &Option<DialogId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

/// Upper bound on auto-continues fired by one [`DialogEngine::advance`].
/// A cycle of auto-continuing dialogs would otherwise fire once per delay
/// for as long as `elapsed` lasts.
pub const MAX_FIRES_PER_ADVANCE: usize = 10_000;

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleState<'a> {
    pub current_dialog_id: Option<DialogId>,
    pub current_dialog: Option<&'a Dialog>,
    pub history: &'a [HistoryEntry],
    pub is_terminal: bool,
    pub available_options: &'a [DialogOption],
}

/// Plays back a dialog graph.
///
/// States are `Active(id)` while the current id resolves and `Terminal`
/// otherwise; only [`DialogEngine::restart`] leaves `Terminal`. Time moves
/// only through [`DialogEngine::advance`], or through the host calling
/// [`DialogEngine::fire_auto_continue`] with a ticket it was handed.
pub struct DialogEngine {
    graph: DialogGraph,
    initial_dialog_id: Option<DialogId>,
    current_dialog_id: Option<DialogId>,
    history: HistoryLog,
    timer: AutoContinueTimer,
    clock: Duration,
    config: PlaybackConfig,
}

/// Builder for constructing a `DialogEngine`.
pub struct DialogEngineBuilder {
    graph: Option<DialogGraph>,
    graph_path: Option<String>,
    config: Option<PlaybackConfig>,
    config_path: Option<String>,
    start_dialog: Option<DialogId>,
}

impl DialogEngine {
    pub fn builder() -> DialogEngineBuilder {
        DialogEngineBuilder {
            graph: None,
            graph_path: None,
            config: None,
            config_path: None,
            start_dialog: None,
        }
    }

    /// Start a session with the default playback config.
    pub fn new(graph: DialogGraph, start_dialog: Option<DialogId>) -> Self {
        Self::with_config(graph, start_dialog, PlaybackConfig::default())
    }

    /// Start a session without validating `config`; the builder validates.
    pub(crate) fn with_config(
        graph: DialogGraph,
        start_dialog: Option<DialogId>,
        config: PlaybackConfig,
    ) -> Self {
        let initial_dialog_id = start_dialog
            .or(config.start_dialog)
            .or_else(|| graph.first_dialog_id());
        let timer = AutoContinueTimer::new(config.auto_continue_delay());

        let mut engine = Self {
            graph,
            initial_dialog_id,
            current_dialog_id: initial_dialog_id,
            history: HistoryLog::new(),
            timer,
            clock: Duration::ZERO,
            config,
        };
        tracing::debug!(initial = ?engine.initial_dialog_id, "dialog session started");
        engine.schedule_auto_continue();
        engine
    }

    pub fn graph(&self) -> &DialogGraph {
        &self.graph
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn initial_dialog_id(&self) -> Option<DialogId> {
        self.initial_dialog_id
    }

    pub fn current_dialog_id(&self) -> Option<DialogId> {
        self.current_dialog_id
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Elapsed session time as seen by the auto-continue timer.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn resolve(&self, id: DialogId) -> Option<&Dialog> {
        let found = self.graph.resolve(id);
        tracing::trace!(id = id.0, found = found.is_some(), "resolve dialog");
        found
    }

    pub fn current_dialog(&self) -> Option<&Dialog> {
        self.current_dialog_id.and_then(|id| self.resolve(id))
    }

    pub fn is_terminal(&self) -> bool {
        self.current_dialog().is_none()
    }

    pub fn visible_state(&self) -> VisibleState<'_> {
        let current_dialog = self.current_dialog();
        VisibleState {
            current_dialog_id: self.current_dialog_id,
            current_dialog,
            history: self.history.entries(),
            is_terminal: current_dialog.is_none(),
            available_options: current_dialog
                .map(|d| d.options.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Pick option `index` of the current dialog.
    pub fn select_option(&mut self, index: usize) -> Result<(), InvalidTransition> {
        let dialog = self.active_dialog()?;
        let Some(option) = dialog.options.get(index) else {
            return Err(InvalidTransition::OptionOutOfRange {
                dialog_id: dialog.id,
                index,
                available: dialog.options.len(),
            });
        };

        let entry = HistoryEntry::player_choice(&self.config.player_speaker, &option.text);
        let from = dialog.id;
        let target = dialog.option_target(index);

        tracing::debug!(from = from.0, index, ?target, "option selected");
        self.history.push(entry);
        self.move_to(target);
        Ok(())
    }

    /// Advance past the current option-less dialog.
    pub fn continue_dialog(&mut self) -> Result<(), InvalidTransition> {
        let dialog = self.active_dialog()?;
        if dialog.has_options() {
            return Err(InvalidTransition::OptionsPending {
                dialog_id: dialog.id,
                options: dialog.options.len(),
            });
        }

        let entry = HistoryEntry::from_dialog(dialog);
        let from = dialog.id;
        let target = dialog.continue_target();

        tracing::debug!(from = from.0, ?target, "dialog continued");
        self.history.push(entry);
        self.move_to(target);
        Ok(())
    }

    /// Back to the initial dialog with an empty history.
    pub fn restart(&mut self) {
        tracing::debug!(initial = ?self.initial_dialog_id, "dialog session restarted");
        self.history.clear();
        self.move_to(self.initial_dialog_id);
    }

    pub fn pending_auto_continue(&self) -> Option<AutoContinue> {
        self.timer.pending()
    }

    /// Fire the auto-continue identified by `ticket`. Returns `false`, doing
    /// nothing, when the ticket was cancelled or superseded, or when the
    /// dialog it targets is no longer current.
    pub fn fire_auto_continue(&mut self, ticket: u64) -> bool {
        let Some(scheduled) = self.timer.claim(ticket) else {
            tracing::trace!(ticket, "stale auto-continue ignored");
            return false;
        };
        if self.current_dialog_id != Some(scheduled.dialog_id) {
            tracing::trace!(
                ticket,
                dialog = scheduled.dialog_id.0,
                "auto-continue for a dialog that is no longer current"
            );
            return false;
        }

        tracing::debug!(dialog = scheduled.dialog_id.0, "auto-continue fired");
        // claim() emptied the slot; a failure here leaves no timer behind.
        self.continue_dialog().is_ok()
    }

    /// Move the clock forward, firing every auto-continue that falls due on
    /// the way. Returns how many fired.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let target = self.clock.saturating_add(elapsed);
        let mut fired = 0;

        while let Some(due) = self.timer.due_by(target) {
            if fired == MAX_FIRES_PER_ADVANCE {
                tracing::warn!(
                    fired,
                    dialog = due.dialog_id.0,
                    "auto-continue limit reached for one advance"
                );
                break;
            }
            // Chained continuations are scheduled relative to when they fired.
            self.clock = due.due_at;
            if self.fire_auto_continue(due.ticket) {
                fired += 1;
            }
            // A saturated clock reschedules at the same instant forever.
            if let Some(next) = self.timer.pending() {
                if next.due_at <= due.due_at {
                    tracing::warn!(
                        dialog = next.dialog_id.0,
                        "clock saturated; auto-continue left pending"
                    );
                    break;
                }
            }
        }

        self.clock = target;
        // Cut short by the limit: re-arm from `target` so time never runs backwards.
        if self.timer.pending().map_or(false, |p| p.due_at < target) {
            self.schedule_auto_continue();
        }
        fired
    }

    fn active_dialog(&self) -> Result<&Dialog, InvalidTransition> {
        self.current_dialog().ok_or(InvalidTransition::Terminal {
            dialog_id: self.current_dialog_id,
        })
    }

    fn move_to(&mut self, target: Option<DialogId>) {
        if let Some(cancelled) = self.timer.cancel() {
            tracing::trace!(ticket = cancelled.ticket, "auto-continue cancelled");
        }
        self.current_dialog_id = target;
        if self.is_terminal() {
            tracing::debug!(id = ?target, "reached terminal state");
        }
        self.schedule_auto_continue();
    }

    fn schedule_auto_continue(&mut self) {
        if !self.config.auto_continue {
            return;
        }
        let Some(dialog) = self.current_dialog() else {
            return;
        };
        if !dialog.auto_continues() {
            return;
        }
        let id = dialog.id;
        let scheduled = self.timer.schedule(id, self.clock);
        tracing::debug!(
            dialog = id.0,
            ticket = scheduled.ticket,
            due_ms = scheduled.due_at.as_millis() as u64,
            "auto-continue scheduled"
        );
    }
}

impl DialogEngineBuilder {
    pub fn graph_path(mut self, path: &str) -> Self {
        self.graph_path = Some(path.to_string());
        self
    }

    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn start_dialog(mut self, id: DialogId) -> Self {
        self.start_dialog = Some(id);
        self
    }

    /// Provide the graph directly (for testing without files).
    pub fn with_graph(mut self, graph: DialogGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Provide the config directly (for testing without files).
    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<DialogEngine, EngineError> {
        let graph = match (self.graph, self.graph_path) {
            (Some(graph), _) => graph,
            (None, Some(path)) => DialogGraph::load_from_json(Path::new(&path))?,
            (None, None) => DialogGraph::default(),
        };

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => PlaybackConfig::load_from_ron(Path::new(&path))?,
            (None, None) => PlaybackConfig::default(),
        };
        config.validate()?;

        Ok(DialogEngine::with_config(graph, self.start_dialog, config))
    }
}
