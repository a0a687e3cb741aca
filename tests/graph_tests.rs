/// Graph loading, export and linting integration tests.

use dialog_engine::core::graph::DialogGraph;
use dialog_engine::core::lint::{lint_graph, LintIssue};
use dialog_engine::schema::dialog::{Animation, DialogId, DialogImage, Position};
use std::path::Path;

#[test]
fn village_gate_loads() {
    let graph = DialogGraph::load_from_json(Path::new("tests/fixtures/village_gate.json")).unwrap();
    assert_eq!(graph.scenes().len(), 2);
    assert_eq!(graph.dialog_count(), 8);
    assert_eq!(graph.first_dialog_id(), Some(DialogId(1)));
    assert!(graph.duplicates().is_empty());

    let gate = &graph.scenes()[0];
    assert_eq!(gate.label, "Village Gate");
    assert_eq!(gate.npc_name, "Olaf");
    assert_eq!(gate.npc_state, "Guarding");
    assert_eq!(gate.player_state, "Arrived");

    let question = graph.resolve(DialogId(2)).unwrap();
    assert_eq!(question.image, DialogImage::Thinking);
    assert_eq!(question.options.len(), 3);
    assert_eq!(question.options[2].next_dialog, None);

    let mira = graph.resolve(DialogId(7)).unwrap();
    assert_eq!(mira.position, Position::Right);
    assert_eq!(mira.characters[0].animation, Animation::Running);

    let farewell = graph.resolve(DialogId(8)).unwrap();
    assert_eq!(farewell.end_dialog.next_state.len(), 2);
    assert_eq!(farewell.end_dialog.next_state[1].name, "Olaf");
    assert_eq!(farewell.end_dialog.next_state[1].state, "Waiting");
}

#[test]
fn export_is_byte_identical_to_authoring_tool_output() {
    for fixture in ["tests/fixtures/village_gate.json", "tests/fixtures/snow_talk.json"] {
        let original = std::fs::read_to_string(fixture).unwrap();
        let graph = DialogGraph::parse_json(&original).unwrap();
        assert_eq!(graph.to_json_pretty().unwrap(), original, "round trip of {}", fixture);
    }
}

#[test]
fn save_then_load() {
    let graph = DialogGraph::load_from_json(Path::new("tests/fixtures/village_gate.json")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dialog-scenes.json");

    graph.save_to_json(&path).unwrap();
    let reloaded = DialogGraph::load_from_json(&path).unwrap();
    assert_eq!(reloaded.scenes(), graph.scenes());
}

#[test]
fn malformed_graph_fails_at_load() {
    let result = DialogGraph::load_from_json(Path::new("tests/fixtures/malformed.json"));
    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("JSON error"), "unexpected error: {}", message);
}

#[test]
fn missing_file_is_io_error() {
    let result = DialogGraph::load_from_json(Path::new("tests/fixtures/does_not_exist.json"));
    assert!(matches!(
        result,
        Err(dialog_engine::core::graph::GraphError::Io(_))
    ));
}

#[test]
fn sample_data_matches_fixture() {
    let sample = std::fs::read_to_string("dialog_data/village_gate.json").unwrap();
    let fixture = std::fs::read_to_string("tests/fixtures/village_gate.json").unwrap();
    assert_eq!(sample, fixture);
}

#[test]
fn village_gate_lint() {
    let graph = DialogGraph::load_from_json(Path::new("tests/fixtures/village_gate.json")).unwrap();
    let report = lint_graph(&graph, None);

    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 2, "warnings: {:?}", report.warnings);
    assert!(report.warnings.contains(&LintIssue::FallbackOption {
        from: DialogId(2),
        option: 2,
    }));
    assert!(report.warnings.contains(&LintIssue::DanglingNext {
        from: DialogId(4),
        target: DialogId(100),
    }));
}

#[test]
fn snow_talk_lint_flags_fallthrough() {
    let graph = DialogGraph::load_from_json(Path::new("tests/fixtures/snow_talk.json")).unwrap();
    let report = lint_graph(&graph, None);
    assert!(report.warnings.contains(&LintIssue::FallthroughIntoBranch {
        from: DialogId(3),
        target: DialogId(4),
    }));
}
