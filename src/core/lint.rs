/// Graph linter — static checks over authored routing.
///
/// Nothing reported here stops playback; the engine tolerates all of it.
/// Errors are things the authoring tool should never have let through,
/// warnings are legal content that is likely to surprise a player.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fmt;

use crate::core::graph::{DialogGraph, Location};
use crate::schema::dialog::DialogId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintIssue {
    DuplicateDialogId {
        id: DialogId,
        first: Location,
        duplicate: Location,
    },
    DanglingNext {
        from: DialogId,
        target: DialogId,
    },
    DanglingOption {
        from: DialogId,
        option: usize,
        target: DialogId,
    },
    /// An option with no target; it routes to `from + 1`.
    FallbackOption {
        from: DialogId,
        option: usize,
    },
    /// An unrouted line whose `id + 1` is also the explicit target of some
    /// option, so continuing walks into another branch.
    FallthroughIntoBranch {
        from: DialogId,
        target: DialogId,
    },
    Unreachable {
        id: DialogId,
    },
    EmptyText {
        id: DialogId,
    },
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDialogId {
                id,
                first,
                duplicate,
            } => write!(
                f,
                "Dialog id {} appears in scene {} (dialog {}) and again in scene {} (dialog {})",
                id,
                first.scene + 1,
                first.dialog + 1,
                duplicate.scene + 1,
                duplicate.dialog + 1
            ),
            Self::DanglingNext { from, target } => write!(
                f,
                "Dialog {} continues to non-existent dialog {}",
                from, target
            ),
            Self::DanglingOption {
                from,
                option,
                target,
            } => write!(
                f,
                "Dialog {} option {} leads to non-existent dialog {}",
                from,
                option + 1,
                target
            ),
            Self::FallbackOption { from, option } => write!(
                f,
                "Dialog {} option {} has no target and falls back to the next id",
                from,
                option + 1
            ),
            Self::FallthroughIntoBranch { from, target } => write!(
                f,
                "Dialog {} has no next id and falls through into dialog {}, which is an option target",
                from, target
            ),
            Self::Unreachable { id } => write!(f, "Dialog {} is unreachable from the start", id),
            Self::EmptyText { id } => write!(f, "Dialog {} has no text", id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Check `graph` as it would be played from `start` (or its first dialog).
pub fn lint_graph(graph: &DialogGraph, start: Option<DialogId>) -> LintReport {
    let mut report = LintReport::default();

    for dup in graph.duplicates() {
        report.errors.push(LintIssue::DuplicateDialogId {
            id: dup.id,
            first: dup.first,
            duplicate: dup.duplicate,
        });
    }

    let option_targets: FxHashSet<DialogId> = graph
        .dialogs()
        .flat_map(|d| d.options.iter().filter_map(|o| o.next_dialog))
        .collect();

    // Only the indexed occurrence of each id takes part in playback.
    let mut checked = FxHashSet::default();
    for dialog in graph.dialogs() {
        if !checked.insert(dialog.id) {
            continue;
        }

        if dialog.text.trim().is_empty() {
            report.warnings.push(LintIssue::EmptyText { id: dialog.id });
        }

        if dialog.options.is_empty() {
            match dialog.next_dialog_id {
                Some(target) if !graph.contains(target) => {
                    report.warnings.push(LintIssue::DanglingNext {
                        from: dialog.id,
                        target,
                    });
                }
                Some(_) => {}
                None => {
                    if let Some(target) = dialog.id.successor() {
                        if option_targets.contains(&target) {
                            report.warnings.push(LintIssue::FallthroughIntoBranch {
                                from: dialog.id,
                                target,
                            });
                        }
                    }
                }
            }
        }

        for (i, option) in dialog.options.iter().enumerate() {
            match option.next_dialog {
                Some(target) if !graph.contains(target) => {
                    report.warnings.push(LintIssue::DanglingOption {
                        from: dialog.id,
                        option: i,
                        target,
                    });
                }
                Some(_) => {}
                None => {
                    report.warnings.push(LintIssue::FallbackOption {
                        from: dialog.id,
                        option: i,
                    });
                }
            }
        }
    }

    let reachable = reachable_from(graph, start.or_else(|| graph.first_dialog_id()));
    let mut seen = FxHashSet::default();
    for dialog in graph.dialogs() {
        if seen.insert(dialog.id) && !reachable.contains(&dialog.id) {
            report.warnings.push(LintIssue::Unreachable { id: dialog.id });
        }
    }

    report
}

/// Every resolvable id the engine could visit from `start`, following the
/// same routing rules as playback (including the fallback increment).
pub fn reachable_from(graph: &DialogGraph, start: Option<DialogId>) -> FxHashSet<DialogId> {
    let mut visited = FxHashSet::default();
    let mut queue: VecDeque<DialogId> = start.into_iter().collect();

    while let Some(id) = queue.pop_front() {
        let Some(dialog) = graph.resolve(id) else {
            continue;
        };
        if !visited.insert(id) {
            continue;
        }
        if dialog.options.is_empty() {
            queue.extend(dialog.continue_target());
        } else {
            queue.extend((0..dialog.options.len()).filter_map(|i| dialog.option_target(i)));
        }
    }

    visited
}

/// Counts of each issue kind, for summaries.
pub fn issue_counts(report: &LintReport) -> FxHashMap<&'static str, usize> {
    let mut counts = FxHashMap::default();
    for issue in report.errors.iter().chain(&report.warnings) {
        let kind = match issue {
            LintIssue::DuplicateDialogId { .. } => "duplicate_id",
            LintIssue::DanglingNext { .. } => "dangling_next",
            LintIssue::DanglingOption { .. } => "dangling_option",
            LintIssue::FallbackOption { .. } => "fallback_option",
            LintIssue::FallthroughIntoBranch { .. } => "fallthrough",
            LintIssue::Unreachable { .. } => "unreachable",
            LintIssue::EmptyText { .. } => "empty_text",
        };
        *counts.entry(kind).or_insert(0) += 1;
    }
    counts
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

    fn choice(next: Option<i64>) -> DialogOption {
        DialogOption {
            text: "pick".to_string(),
            next_dialog: next.map(DialogId),
        }
    }

    fn graph(scenes: Vec<Vec<Dialog>>) -> DialogGraph {
        DialogGraph::new(
            scenes
                .into_iter()
                .map(|dialogs| Scene {
                    dialogs,
                    ..Scene::default()
                })
                .collect(),
        )
    }

    #[test]
    fn clean_linear_graph() {
        let g = graph(vec![vec![line(1, Some(2)), line(2, Some(3)), line(3, Some(50))]]);
        let report = lint_graph(&g, None);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec![LintIssue::DanglingNext {
                from: DialogId(3),
                target: DialogId(50)
            }]
        );
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let g = graph(vec![vec![line(1, None)], vec![line(1, None)]]);
        let report = lint_graph(&g, None);
        assert!(report.has_errors());
        assert!(matches!(
            report.errors[0],
            LintIssue::DuplicateDialogId { id: DialogId(1), .. }
        ));
    }

    #[test]
    fn fallthrough_into_branch_detected() {
        let mut question = line(1, None);
        question.options = vec![choice(Some(3)), choice(Some(4))];
        let g = graph(vec![vec![question, line(3, None), line(4, None)]]);

        let report = lint_graph(&g, None);
        assert!(report.warnings.contains(&LintIssue::FallthroughIntoBranch {
            from: DialogId(3),
            target: DialogId(4)
        }));
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, LintIssue::FallthroughIntoBranch { from: DialogId(4), .. })));
    }

    #[test]
    fn fallback_and_dangling_options() {
        let mut question = line(1, None);
        question.options = vec![choice(None), choice(Some(9))];
        let g = graph(vec![vec![question, line(2, Some(1))]]);

        let report = lint_graph(&g, None);
        assert!(report.warnings.contains(&LintIssue::FallbackOption {
            from: DialogId(1),
            option: 0
        }));
        assert!(report.warnings.contains(&LintIssue::DanglingOption {
            from: DialogId(1),
            option: 1,
            target: DialogId(9)
        }));
    }

    #[test]
    fn unreachable_dialogs_reported() {
        let g = graph(vec![vec![line(1, Some(1))], vec![line(7, None)]]);
        let report = lint_graph(&g, None);
        assert!(report
            .warnings
            .contains(&LintIssue::Unreachable { id: DialogId(7) }));

        let from_seven = lint_graph(&g, Some(DialogId(7)));
        assert!(from_seven
            .warnings
            .contains(&LintIssue::Unreachable { id: DialogId(1) }));
    }

    #[test]
    fn reachability_follows_fallback_increment() {
        let g = graph(vec![vec![line(1, None)], vec![line(2, None)]]);
        let reachable = reachable_from(&g, Some(DialogId(1)));
        assert!(reachable.contains(&DialogId(2)));
    }

    #[test]
    fn empty_text_warning() {
        let g = graph(vec![vec![Dialog::new(DialogId(1))]]);
        let report = lint_graph(&g, None);
        assert!(report
            .warnings
            .contains(&LintIssue::EmptyText { id: DialogId(1) }));
        assert_eq!(issue_counts(&report).get("empty_text"), Some(&1));
    }

    #[test]
    fn issue_display_is_one_based() {
        let issue = LintIssue::DanglingOption {
            from: DialogId(4),
            option: 0,
            target: DialogId(8),
        };
        assert_eq!(
            issue.to_string(),
            "Dialog 4 option 1 leads to non-existent dialog 8"
        );
    }
}
