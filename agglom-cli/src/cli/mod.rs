//! Command-line interface for clustering edge-list graphs.
//!
//! The `run` command loads a graph and optional ground truth, runs the
//! configured heuristic over one or more coarsening levels and reports
//! cluster sizes, modularity and pairwise agreement per level.

mod commands;

pub use commands::{Cli, CliError, Command, ExecutionSummary, RunCommand, render_summary, run_cli};
