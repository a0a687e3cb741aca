/// Random walk — seeded playthroughs for previewing and smoke-testing graphs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::core::config::PlaybackConfig;
use crate::core::engine::DialogEngine;
use crate::core::graph::DialogGraph;
use crate::core::history::HistoryEntry;
use crate::schema::dialog::DialogId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WalkOutcome {
    /// The walk reached an id that does not resolve.
    Terminal,
    /// The walk was cut off, typically because the graph cycles.
    StepLimit,
}

#[derive(Debug, Clone, Serialize)]
pub struct Playthrough {
    /// Every dialog shown, in order, starting with the initial one.
    pub path: Vec<DialogId>,
    pub history: Vec<HistoryEntry>,
    /// The id the walk ended on; for a terminal walk this is the dangling one.
    pub final_dialog_id: Option<DialogId>,
    pub outcome: WalkOutcome,
}

/// Play `graph` from `start` (or its first dialog), picking options
/// uniformly at random. Auto-continue is disabled; option-less dialogs are
/// continued immediately. At most `max_steps` transitions are taken.
pub fn random_walk(
    graph: &DialogGraph,
    start: Option<DialogId>,
    seed: u64,
    max_steps: usize,
) -> Playthrough {
    let config = PlaybackConfig {
        auto_continue: false,
        ..PlaybackConfig::default()
    };
    random_walk_with(graph, start, seed, max_steps, config)
}

/// Same as [`random_walk`] with a caller-supplied config. Its
/// `auto_continue` flag is ignored.
pub fn random_walk_with(
    graph: &DialogGraph,
    start: Option<DialogId>,
    seed: u64,
    max_steps: usize,
    config: PlaybackConfig,
) -> Playthrough {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = PlaybackConfig {
        auto_continue: false,
        ..config
    };
    let mut engine = DialogEngine::with_config(graph.clone(), start, config);

    let mut path = Vec::new();
    let mut outcome = WalkOutcome::StepLimit;

    for _ in 0..=max_steps {
        let Some(dialog) = engine.current_dialog() else {
            outcome = WalkOutcome::Terminal;
            break;
        };
        path.push(dialog.id);
        if path.len() > max_steps {
            break;
        }

        let options = dialog.options.len();
        let step = if options == 0 {
            engine.continue_dialog()
        } else {
            engine.select_option(rng.gen_range(0..options))
        };
        if let Err(e) = step {
            tracing::warn!(error = %e, "random walk stopped on an invalid transition");
            break;
        }
    }

    tracing::debug!(seed, steps = path.len(), ?outcome, "random walk finished");
    Playthrough {
        path,
        history: engine.history().entries().to_vec(),
        final_dialog_id: engine.current_dialog_id(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::dialog::{Dialog, DialogOption};
    use crate::schema::scene::Scene;

    fn line(id: i64, next: Option<i64>) -> Dialog {
        Dialog {
            text: format!("line {id}"),
            next_dialog_id: next.map(DialogId),
            ..Dialog::new(DialogId(id))
        }
    }

    fn graph(dialogs: Vec<Dialog>) -> DialogGraph {
        DialogGraph::new(vec![Scene {
            dialogs,
            ..Scene::default()
        }])
    }

    fn branching() -> DialogGraph {
        let mut hub = line(1, None);
        hub.options = (0..4)
            .map(|i| DialogOption {
                text: format!("choice {i}"),
                next_dialog: Some(DialogId(10 + i)),
            })
            .collect();
        graph(vec![
            hub,
            line(10, Some(99)),
            line(11, Some(99)),
            line(12, Some(99)),
            line(13, Some(99)),
        ])
    }

    #[test]
    fn linear_graph_ends_terminal() {
        let walk = random_walk(&graph(vec![line(1, None), line(2, None)]), None, 0, 100);
        assert_eq!(walk.path, vec![DialogId(1), DialogId(2)]);
        assert_eq!(walk.final_dialog_id, Some(DialogId(3)));
        assert_eq!(walk.outcome, WalkOutcome::Terminal);
        assert_eq!(walk.history.len(), 2);
    }

    #[test]
    fn same_seed_same_playthrough() {
        let g = branching();
        let a = random_walk(&g, None, 7, 10);
        let b = random_walk(&g, None, 7, 10);
        assert_eq!(a.path, b.path);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn seeds_cover_different_branches() {
        let g = branching();
        let mut seen = std::collections::HashSet::new();
        for seed in 0..50 {
            let walk = random_walk(&g, None, seed, 10);
            seen.insert(walk.path[1]);
        }
        assert!(seen.len() > 1, "expected more than one branch, got {:?}", seen);
    }

    #[test]
    fn cycle_hits_step_limit() {
        let walk = random_walk(&graph(vec![line(1, Some(2)), line(2, Some(1))]), None, 0, 6);
        assert_eq!(walk.outcome, WalkOutcome::StepLimit);
        assert_eq!(walk.path.len(), 7);
        assert_eq!(walk.history.len(), 6);
    }

    #[test]
    fn empty_graph_is_immediately_terminal() {
        let walk = random_walk(&DialogGraph::default(), None, 0, 10);
        assert!(walk.path.is_empty());
        assert_eq!(walk.outcome, WalkOutcome::Terminal);
    }
}
