/// Preview — interactive playback shell for exported dialog graphs.
///
/// Usage: preview <graph.json> [--start <id>] [--config <playback.ron>] [-v]
///
/// Commands:
///   <n>            — pick option n (1-based)
///   continue | c   — advance past a line without options
///   wait <ms>      — let time pass; due auto-continues fire
///   restart | r    — back to the start with an empty history
///   history        — print the lines shown so far
///   state          — print the current dialog and pending timer
///   walk [seed]    — random playthrough from the start
///   bulk <n>       — n random playthroughs with outcome stats
///   help           — list commands
///   quit           — exit

use clap::Parser;
use dialog_engine::core::engine::DialogEngine;
use dialog_engine::core::history::HistoryEntry;
use dialog_engine::core::walk::{random_walk_with, WalkOutcome};
use dialog_engine::schema::dialog::{DialogId, Position};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

const WALK_STEP_LIMIT: usize = 500;

#[derive(Parser, Debug)]
#[command(name = "preview")]
#[command(about = "Play back a dialog graph in the terminal")]
struct Args {
    /// Graph file exported by the authoring tool
    #[arg(value_name = "GRAPH")]
    graph: PathBuf,

    /// Dialog id to start from (defaults to the first dialog)
    #[arg(long, value_name = "ID")]
    start: Option<i64>,

    /// Playback config in RON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log engine transitions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut builder = DialogEngine::builder().graph_path(&args.graph.to_string_lossy());
    if let Some(ref path) = args.config {
        builder = builder.config_path(&path.to_string_lossy());
    }
    if let Some(id) = args.start {
        builder = builder.start_dialog(DialogId(id));
    }

    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Loaded {} scenes, {} dialogs",
        engine.graph().scenes().len(),
        engine.graph().dialog_count()
    );
    if engine.config().auto_continue {
        println!(
            "Auto-continue after {} ms (use 'wait <ms>')",
            engine.config().auto_continue_delay_ms
        );
    }
    println!("Type 'help' for commands.\n");
    print_current(&engine);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        if let Ok(choice) = cmd.parse::<usize>() {
            if choice == 0 {
                println!("Options are numbered from 1.");
                continue;
            }
            let before = engine.history().len();
            match engine.select_option(choice - 1) {
                Ok(()) => {
                    print_new_entries(&engine, before);
                    print_current(&engine);
                }
                Err(e) => println!("ERROR: {}", e),
            }
            continue;
        }

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "continue" | "c" => {
                let before = engine.history().len();
                match engine.continue_dialog() {
                    Ok(()) => {
                        print_new_entries(&engine, before);
                        print_current(&engine);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "wait" => {
                let ms: u64 = match parts.get(1).map(|s| s.parse()) {
                    Some(Ok(ms)) => ms,
                    _ => {
                        println!("Usage: wait <ms>");
                        continue;
                    }
                };
                let before = engine.history().len();
                let fired = engine.advance(Duration::from_millis(ms));
                if fired == 0 {
                    println!("(nothing happened)");
                } else {
                    print_new_entries(&engine, before);
                    print_current(&engine);
                }
            }
            "restart" | "r" => {
                engine.restart();
                println!("--- Restarted ---");
                print_current(&engine);
            }
            "history" => {
                if engine.history().is_empty() {
                    println!("(empty)");
                }
                for entry in engine.history() {
                    print_entry(entry);
                }
            }
            "state" => {
                print_state(&engine);
            }
            "walk" => {
                let seed: u64 = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
                let walk = random_walk_with(
                    engine.graph(),
                    engine.initial_dialog_id(),
                    seed,
                    WALK_STEP_LIMIT,
                    engine.config().clone(),
                );
                println!("\n--- Walk (seed {}) ---", seed);
                for entry in &walk.history {
                    print_entry(entry);
                }
                println!(
                    "--- {:?} after {} dialogs, on {} ---\n",
                    walk.outcome,
                    walk.path.len(),
                    describe_id(walk.final_dialog_id)
                );
            }
            "bulk" => {
                let count: u64 = match parts.get(1).map(|s| s.parse()) {
                    Some(Ok(n)) if n > 0 => n,
                    _ => {
                        println!("Usage: bulk <n>");
                        continue;
                    }
                };
                run_bulk(&engine, count);
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn run_bulk(engine: &DialogEngine, count: u64) {
    let mut terminal = 0;
    let mut step_limited = 0;
    let mut endings: Vec<String> = Vec::new();
    let mut visited: HashSet<DialogId> = HashSet::new();
    let mut total_len = 0usize;

    for seed in 0..count {
        let walk = random_walk_with(
            engine.graph(),
            engine.initial_dialog_id(),
            seed,
            WALK_STEP_LIMIT,
            engine.config().clone(),
        );
        match walk.outcome {
            WalkOutcome::Terminal => terminal += 1,
            WalkOutcome::StepLimit => step_limited += 1,
        }
        total_len += walk.path.len();
        visited.extend(walk.path.iter().copied());
        endings.push(describe_id(walk.final_dialog_id));
    }

    println!("\n=== Bulk Playback: {} walks ===\n", count);
    println!("Ended terminal: {}", terminal);
    println!("Hit step limit: {}", step_limited);
    println!(
        "Average length: {:.1} dialogs",
        total_len as f64 / count as f64
    );
    println!(
        "Dialogs visited: {} / {}",
        visited.len(),
        engine.graph().dialog_count()
    );

    endings.sort();
    endings.dedup();
    println!("Distinct endings: {}", endings.join(", "));
    println!();
}

fn print_current(engine: &DialogEngine) {
    let state = engine.visible_state();
    match state.current_dialog {
        Some(dialog) => {
            println!("\n[{}] {}: {}", dialog.id, display_speaker(&dialog.speaker), dialog.text);
            if state.available_options.is_empty() {
                println!("  (continue)");
            }
            for (i, option) in state.available_options.iter().enumerate() {
                println!("  {}. {}", i + 1, option.text);
            }
        }
        None => {
            println!(
                "\n--- End of dialog ({}). Type 'restart' to play again. ---",
                describe_id(state.current_dialog_id)
            );
        }
    }
    println!();
}

fn print_new_entries(engine: &DialogEngine, from: usize) {
    for entry in engine.history().entries().iter().skip(from) {
        print_entry(entry);
    }
}

fn print_entry(entry: &HistoryEntry) {
    let speaker = display_speaker(&entry.speaker);
    match entry.position {
        Position::Left => println!("  {}: {}", speaker, entry.text),
        Position::Center => println!("        {}: {}", speaker, entry.text),
        Position::Right => println!("                {}: {}", speaker, entry.text),
    }
}

fn print_state(engine: &DialogEngine) {
    let state = engine.visible_state();
    println!("Current:  {}", describe_id(state.current_dialog_id));
    println!("Terminal: {}", state.is_terminal);
    println!("History:  {} entries", state.history.len());
    println!("Clock:    {} ms", engine.clock().as_millis());
    match engine.pending_auto_continue() {
        Some(pending) => println!(
            "Pending:  auto-continue of {} at {} ms (ticket {})",
            pending.dialog_id,
            pending.due_at.as_millis(),
            pending.ticket
        ),
        None => println!("Pending:  none"),
    }
}

fn display_speaker(speaker: &str) -> &str {
    if speaker.is_empty() {
        "(narrator)"
    } else {
        speaker
    }
}

fn describe_id(id: Option<DialogId>) -> String {
    match id {
        Some(id) => format!("dialog {}", id),
        None => "no dialog".to_string(),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <n>            Pick option n (1-based)");
    println!("  continue | c   Advance past a line without options");
    println!("  wait <ms>      Let time pass; due auto-continues fire");
    println!("  restart | r    Back to the start with an empty history");
    println!("  history        Print the lines shown so far");
    println!("  state          Print position, clock and pending timer");
    println!("  walk [seed]    Random playthrough from the start");
    println!("  bulk <n>       n random playthroughs with outcome stats");
    println!("  help           Show this help");
    println!("  quit           Exit");
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "dialog_engine=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

