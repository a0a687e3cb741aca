/// Dialog Linter — validates routing in exported dialog graphs.
///
/// Usage: dialog_linter <graph.json>... [--start <id>] [-v]

use clap::Parser;
use dialog_engine::core::graph::DialogGraph;
use dialog_engine::core::lint::{issue_counts, lint_graph};
use dialog_engine::schema::dialog::DialogId;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "dialog_linter")]
#[command(about = "Check dialog graphs for duplicate ids, dangling routes and unreachable lines")]
struct Args {
    /// Graph files exported by the authoring tool
    #[arg(required = true, value_name = "GRAPH")]
    graphs: Vec<PathBuf>,

    /// Dialog id playback starts from (defaults to the first dialog)
    #[arg(long, value_name = "ID")]
    start: Option<i64>,

    /// Print per-kind issue counts; also enables debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for path in &args.graphs {
        let graph = match DialogGraph::load_from_json(path) {
            Ok(graph) => graph,
            Err(e) => {
                eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                total_errors += 1;
                continue;
            }
        };

        println!(
            "Loaded {} scenes, {} dialogs from {}",
            graph.scenes().len(),
            graph.dialog_count(),
            path.display()
        );

        let report = lint_graph(&graph, args.start.map(DialogId));

        println!("\n=== Dialog Lint Report: {} ===\n", path.display());
        if report.is_clean() {
            println!("All checks passed!");
        }
        for warning in &report.warnings {
            println!("WARNING: {}", warning);
        }
        for error in &report.errors {
            println!("ERROR: {}", error);
        }

        if args.verbose {
            let mut counts: Vec<_> = issue_counts(&report).into_iter().collect();
            counts.sort();
            for (kind, count) in counts {
                println!("  {:<16} {}", kind, count);
            }
        }

        total_errors += report.errors.len();
        total_warnings += report.warnings.len();
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        total_errors, total_warnings
    );

    if total_errors > 0 {
        process::exit(1);
    }
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
