//! WASM bindings for dialog-engine — drives the browser dialog preview.
//!
//! The JavaScript side owns real time: after every call it reads
//! `pending_auto_continue()`, arms a `setTimeout` for `delay_ms`, and hands
//! the ticket back through `fire_auto_continue`. Stale tickets are ignored,
//! so the page never has to cancel its own timeouts.

use std::time::Duration;
use wasm_bindgen::prelude::*;

use dialog_engine::core::config::PlaybackConfig;
use dialog_engine::core::engine::DialogEngine;
use dialog_engine::core::graph::DialogGraph;
use dialog_engine::core::lint::lint_graph;
use dialog_engine::core::walk::random_walk_with;
use dialog_engine::schema::dialog::DialogId;

// ---------------------------------------------------------------------------
// Embedded sample graph — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const VILLAGE_GATE: &str = include_str!("../../dialog_data/village_gate.json");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct PendingInfo {
    dialog_id: i64,
    ticket: u64,
    due_at_ms: u64,
    delay_ms: u64,
}

#[derive(serde::Serialize)]
struct LintInfo {
    errors: Vec<String>,
    warnings: Vec<String>,
}

#[derive(serde::Serialize)]
struct GraphInfo {
    scenes: Vec<SceneInfo>,
    dialog_count: usize,
    next_free_dialog_id: i64,
}

#[derive(serde::Serialize)]
struct SceneInfo {
    label: String,
    npc_name: String,
    first_dialog_id: Option<i64>,
}

fn js_err(context: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// DialogPlayer — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct DialogPlayer {
    engine: DialogEngine,
}

#[wasm_bindgen]
impl DialogPlayer {
    /// Start a session over an exported graph. `config_ron` may be empty.
    #[wasm_bindgen(constructor)]
    pub fn new(
        graph_json: &str,
        start_dialog: Option<i64>,
        config_ron: Option<String>,
    ) -> Result<DialogPlayer, JsError> {
        let graph = DialogGraph::parse_json(graph_json).map_err(|e| js_err("Invalid graph", e))?;

        let config = match config_ron.as_deref().map(str::trim) {
            Some(src) if !src.is_empty() => {
                PlaybackConfig::parse_ron(src).map_err(|e| js_err("Invalid config", e))?
            }
            _ => PlaybackConfig::default(),
        };

        let mut builder = DialogEngine::builder().with_graph(graph).with_config(config);
        if let Some(id) = start_dialog {
            builder = builder.start_dialog(DialogId(id));
        }
        let engine = builder
            .build()
            .map_err(|e| js_err("Engine build error", e))?;

        Ok(DialogPlayer { engine })
    }

    /// A player over the bundled sample graph.
    pub fn sample() -> Result<DialogPlayer, JsError> {
        DialogPlayer::new(data::VILLAGE_GATE, None, None)
    }

    /// The bundled sample graph as exported JSON.
    pub fn sample_json() -> String {
        data::VILLAGE_GATE.to_string()
    }

    /// Pick option `index` (0-based) of the current dialog.
    pub fn select_option(&mut self, index: usize) -> Result<(), JsError> {
        self.engine
            .select_option(index)
            .map_err(|e| js_err("Invalid transition", e))
    }

    pub fn continue_dialog(&mut self) -> Result<(), JsError> {
        self.engine
            .continue_dialog()
            .map_err(|e| js_err("Invalid transition", e))
    }

    pub fn restart(&mut self) {
        self.engine.restart();
    }

    /// Current dialog, history, options and terminal flag as JSON.
    pub fn visible_state(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.engine.visible_state())
            .map_err(|e| js_err("Serialization error", e))
    }

    pub fn is_terminal(&self) -> bool {
        self.engine.is_terminal()
    }

    /// The pending auto-continue as JSON, or `null`.
    pub fn pending_auto_continue(&self) -> Result<String, JsError> {
        let clock = self.engine.clock();
        let info = self.engine.pending_auto_continue().map(|p| PendingInfo {
            dialog_id: p.dialog_id.0,
            ticket: p.ticket,
            due_at_ms: p.due_at.as_millis() as u64,
            delay_ms: p.due_at.saturating_sub(clock).as_millis() as u64,
        });
        serde_json::to_string(&info).map_err(|e| js_err("Serialization error", e))
    }

    /// Fire a timer the page armed earlier. Returns whether it advanced.
    pub fn fire_auto_continue(&mut self, ticket: u64) -> bool {
        self.engine.fire_auto_continue(ticket)
    }

    /// Drive the engine clock directly instead of arming timeouts.
    pub fn advance(&mut self, ms: u64) -> usize {
        self.engine.advance(Duration::from_millis(ms))
    }

    /// The graph this session plays, in the authoring tool's export layout.
    pub fn export_json(&self) -> Result<String, JsError> {
        self.engine
            .graph()
            .to_json_pretty()
            .map_err(|e| js_err("Serialization error", e))
    }

    /// Scene summaries for a scene picker.
    pub fn graph_info(&self) -> Result<String, JsError> {
        let graph = self.engine.graph();
        let info = GraphInfo {
            scenes: graph
                .scenes()
                .iter()
                .map(|s| SceneInfo {
                    label: s.label.clone(),
                    npc_name: s.npc_name.clone(),
                    first_dialog_id: s.first_dialog_id().map(|id| id.0),
                })
                .collect(),
            dialog_count: graph.dialog_count(),
            next_free_dialog_id: graph.next_free_dialog_id().0,
        };
        serde_json::to_string(&info).map_err(|e| js_err("Serialization error", e))
    }

    /// A seeded random playthrough from the start, as JSON.
    pub fn random_walk(&self, seed: u64, max_steps: usize) -> Result<String, JsError> {
        let walk = random_walk_with(
            self.engine.graph(),
            self.engine.initial_dialog_id(),
            seed,
            max_steps,
            self.engine.config().clone(),
        );
        serde_json::to_string(&walk).map_err(|e| js_err("Serialization error", e))
    }

    /// Lint an exported graph. Returns `{errors, warnings}` as JSON.
    pub fn lint(graph_json: &str, start_dialog: Option<i64>) -> Result<String, JsError> {
        let graph = DialogGraph::parse_json(graph_json).map_err(|e| js_err("Invalid graph", e))?;
        let report = lint_graph(&graph, start_dialog.map(DialogId));
        let info = LintInfo {
            errors: report.errors.iter().map(|i| i.to_string()).collect(),
            warnings: report.warnings.iter().map(|i| i.to_string()).collect(),
        };
        serde_json::to_string(&info).map_err(|e| js_err("Serialization error", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_graph_parses() {
        let graph = DialogGraph::parse_json(data::VILLAGE_GATE).unwrap();
        assert_eq!(graph.first_dialog_id(), Some(DialogId(1)));
    }

    #[test]
    fn sample_player_plays() {
        let mut player = DialogPlayer::new(data::VILLAGE_GATE, None, None).ok().unwrap();
        assert_eq!(player.advance(1500), 1);
        player.select_option(0).ok().unwrap();

        let state: serde_json::Value = serde_json::from_str(&player.visible_state().ok().unwrap()).unwrap();
        assert_eq!(state["current_dialog_id"], 3);
        assert_eq!(state["history"].as_array().unwrap().len(), 2);

        let pending: serde_json::Value =
            serde_json::from_str(&player.pending_auto_continue().ok().unwrap()).unwrap();
        assert_eq!(pending["dialog_id"], 3);
        assert_eq!(pending["delay_ms"], 1500);
    }
}
