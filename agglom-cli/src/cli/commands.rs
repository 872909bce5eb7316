//! The `run` command and its report renderer.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use agglom_core::{AgglomError, Heuristic, LevelReport, PipelineBuilder, PipelineReport};
use agglom_providers_edgelist::{EdgeListProviderError, EdgeListSource, read_ground_truth};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "agglom",
    about = "Cluster a graph by randomised agglomeration and score the result."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster an edge list and print per-level statistics.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Edge list: a `vertices<TAB>edges` header then one `from<TAB>to` per
    /// line. The header is omitted when `--vertices` is given.
    #[arg(long)]
    pub edges: PathBuf,

    /// Vertex file holding the header and optional `vertex<TAB>original id`
    /// records.
    #[arg(long)]
    pub vertices: Option<PathBuf>,

    /// Ground-truth communities, one tab-separated member list per line.
    #[arg(long)]
    pub truth: Option<PathBuf>,

    /// Merge heuristic, by name (`uniform`) or label (`I.a`).
    #[arg(long, default_value_t = Heuristic::Uniform)]
    pub heuristic: Heuristic,

    /// Number of coarsening levels to cluster.
    #[arg(long, default_value_t = 1)]
    pub levels: usize,

    /// Fixed random seed; derived from the clock when absent.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Score overlapping ground-truth communities as given.
    #[arg(long)]
    pub keep_overlaps: bool,

    /// Override name for the data source (defaults to the edge file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Parsing an input file failed.
    #[error(transparent)]
    Provider(#[from] EdgeListProviderError),
    /// Clustering or scoring failed.
    #[error(transparent)]
    Core(#[from] AgglomError),
}

/// Outcome of a `run` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the clustered graph.
    pub data_source: String,
    /// Per-level measurements.
    pub report: PipelineReport,
    /// Dataset ids from the vertex file, indexed by vertex. Empty when the
    /// edge list carried its own header.
    pub original_ids: Vec<Option<u64>>,
}

/// Executes the command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when an input cannot be read or the pipeline fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use agglom_cli::cli::{Cli, Command, RunCommand, run_cli};
/// # use agglom_core::Heuristic;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "4\t2\n0\t1\n2\t3\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         edges: file.path().to_path_buf(),
///         vertices: None,
///         truth: None,
///         heuristic: Heuristic::Uniform,
///         levels: 1,
///         seed: Some(7),
///         keep_overlaps: false,
///         name: Some("pairs".into()),
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.data_source, "pairs");
/// assert_eq!(summary.report.levels[0].cluster_count(), 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        heuristic = %command.heuristic,
        levels = command.levels,
        data_source = field::Empty,
        truth = command.truth.is_some(),
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let mut builder = PipelineBuilder::new()
        .with_heuristic(command.heuristic)
        .with_levels(command.levels)
        .with_resolve_overlaps(!command.keep_overlaps);
    if let Some(seed) = command.seed {
        builder = builder.with_seed(seed);
    }
    let pipeline = builder.build()?;

    let data_source = derive_data_source_name(&command.edges, command.name.as_deref());
    Span::current().record("data_source", field::display(&data_source));
    let source = load_source(&data_source, &command)?;
    let truth = match command.truth.as_deref() {
        Some(path) => Some(read_ground_truth(
            open_reader(path)?,
            source.edges().vertex_count(),
        )?),
        None => None,
    };
    let report = pipeline.run(source.edges(), truth.as_ref())?;

    info!(
        data_source = data_source.as_str(),
        levels = report.levels.len(),
        seed = report.seed,
        "command completed"
    );
    Ok(ExecutionSummary {
        data_source,
        report,
        original_ids: source.original_ids().to_vec(),
    })
}

fn load_source(name: &str, command: &RunCommand) -> Result<EdgeListSource, CliError> {
    let edges = open_reader(&command.edges)?;
    let source = match command.vertices.as_deref() {
        Some(vertices) => EdgeListSource::try_from_parts(name, open_reader(vertices)?, edges)?,
        None => EdgeListSource::try_from_reader(name, edges)?,
    };
    Ok(source)
}

#[instrument(name = "cli.open_reader", err, fields(path = %path.display()))]
pub(super) fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

/// Writes a human-readable report of `summary` to `writer`.
///
/// Large clusters print as `id:size`. When the vertex file mapped the
/// cluster's lowest vertex to a dataset id, that id follows as `id:size@original`.
///
/// # Errors
/// Returns [`io::Error`] if writing fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use agglom_cli::cli::{ExecutionSummary, render_summary};
/// # use agglom_core::{EdgeList, PipelineBuilder};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let edges = EdgeList::new(3, vec![(0, 1)])?;
/// let report = PipelineBuilder::new().with_seed(1).build()?.run(&edges, None)?;
/// let summary = ExecutionSummary {
///     data_source: "demo".into(),
///     report,
///     original_ids: Vec::new(),
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert!(text.starts_with("data source: demo\n"));
/// assert!(text.contains("level 0: 3 vertices, 1 edges, 2 clusters"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let report = &summary.report;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(
        writer,
        "heuristic: {} ({})",
        report.heuristic,
        report.heuristic.label()
    )?;
    writeln!(writer, "seed: {}", report.seed)?;
    writeln!(
        writer,
        "clustering coefficient: {:.6}",
        report.clustering_coefficient
    )?;
    if report.excluded > 0 {
        writeln!(writer, "excluded from scoring: {}", report.excluded)?;
    }
    for level in &report.levels {
        render_level(level, &summary.original_ids, &mut writer)?;
    }
    Ok(())
}

fn render_level(
    level: &LevelReport,
    original_ids: &[Option<u64>],
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        writer,
        "level {}: {} vertices, {} edges, {} clusters, {} merges",
        level.level,
        level.vertices,
        level.edges,
        level.cluster_count(),
        level.merges
    )?;
    let sizes = &level.sizes;
    if !sizes.large.is_empty() {
        let listed: Vec<String> = sizes
            .large
            .iter()
            .map(|&(cluster, size)| {
                let original = level
                    .partition
                    .clusters()
                    .get(cluster)
                    .and_then(|members| members.iter().min())
                    .and_then(|&vertex| original_ids.get(vertex).copied().flatten());
                match original {
                    Some(original) => format!("{cluster}:{size}@{original}"),
                    None => format!("{cluster}:{size}"),
                }
            })
            .collect();
        writeln!(writer, "  large clusters: {}", listed.join(" "))?;
    }
    writeln!(writer, "  small clusters: {}", sizes.small)?;
    writeln!(writer, "  singletons: {}", sizes.singletons)?;
    writeln!(writer, "  modularity: {:.6}", level.modularity)?;
    match &level.pairwise {
        Some(Ok(scores)) => writeln!(
            writer,
            "  rand: {:.6} jaccard: {:.6} ari: {:.6}",
            scores.rand, scores.jaccard, scores.ari
        )?,
        Some(Err(error)) => writeln!(writer, "  pairwise scoring skipped: {error}")?,
        None => {}
    }
    Ok(())
}
