//! Command-line interface orchestration for the okrug regionalization tool.
//!
//! The CLI offers a `run` command that loads an attribute table and a
//! contiguity file, executes the selected regionalization method, and
//! reports the per-object region assignments.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use okrug_core::{
    AttributeMatrix, DistanceMetric, FloorConstraint, FloorError, Linkage, LocalSearch,
    MaxPParams, Method, Okrug, OkrugBuilder, OkrugError, Order, Regionalization,
};

use crate::input::{self, InputError};

const DEFAULT_REGIONS: usize = 2;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "okrug", about = "Partition spatial objects into contiguous regions.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Execute a regionalization over an attribute table and contiguity file.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to the attribute table, one whitespace-separated row per object.
    pub data: PathBuf,

    /// Path to the contiguity file, one `id: nbr nbr ...` line per object.
    #[arg(long)]
    pub contiguity: PathBuf,

    /// Regionalization method.
    #[arg(long, value_enum, default_value_t = MethodArg::Skater)]
    pub method: MethodArg,

    /// Number of regions to produce (ignored by max-p).
    #[arg(long, default_value_t = DEFAULT_REGIONS)]
    pub regions: usize,

    /// Dissimilarity metric between attribute rows.
    #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
    pub metric: MetricArg,

    /// Linkage rule for REDCAP.
    #[arg(long, value_enum, default_value_t = LinkageArg::Single)]
    pub linkage: LinkageArg,

    /// Distance order for REDCAP.
    #[arg(long, value_enum, default_value_t = OrderArg::FirstOrder)]
    pub order: OrderArg,

    /// Minimum summed floor weight per region.
    #[arg(long)]
    pub floor_threshold: Option<f64>,

    /// Zero-based attribute column supplying floor weights (unit weights
    /// when omitted).
    #[arg(long)]
    pub floor_column: Option<usize>,

    /// Random seed for reproducible max-p runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Local-search strategy for max-p.
    #[arg(long, value_enum, default_value_t = LocalSearchArg::Greedy)]
    pub local_search: LocalSearchArg,

    /// Cooling rate for simulated annealing.
    #[arg(long, default_value_t = 0.85)]
    pub cooling_rate: f64,

    /// Tabu list length for tabu search.
    #[arg(long, default_value_t = 10)]
    pub tabu_length: usize,
}

/// Regionalization methods exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Spanning-tree partitioning.
    Skater,
    /// Constrained agglomerative clustering.
    Redcap,
    /// Floor-driven region growing.
    Maxp,
}

/// Dissimilarity metrics exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Euclidean distance between attribute rows.
    Euclidean,
    /// Manhattan distance between attribute rows.
    Manhattan,
}

/// REDCAP linkage rules exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkageArg {
    /// Closest pair across clusters.
    Single,
    /// Farthest pair across clusters.
    Complete,
    /// Mean pairwise distance across clusters.
    Average,
}

/// REDCAP distance orders exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Restrict cluster distances to first-order contiguity edges.
    FirstOrder,
    /// Recompute cluster distances over all member pairs.
    FullOrder,
}

/// Max-p local-search strategies exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocalSearchArg {
    /// Accept only improving moves.
    Greedy,
    /// Simulated annealing.
    Annealing,
    /// Tabu search.
    Tabu,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input file.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Input parsing failed.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The floor weight configuration was invalid.
    #[error(transparent)]
    Floor(#[from] FloorError),
    /// The floor column index exceeds the attribute column count.
    #[error("floor column {column} is out of range for {cols} attribute columns")]
    FloorColumnOutOfRange {
        /// Requested zero-based column index.
        column: usize,
        /// Number of columns in the attribute table.
        cols: usize,
    },
    /// Core regionalization failed.
    #[error(transparent)]
    Core(#[from] OkrugError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the attribute table the run was executed against.
    pub data_source: String,
    /// Assignments produced by the run.
    pub result: Regionalization,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when parsing or execution fails.
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => run_command(run),
    }
}

fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let matrix = input::parse_attributes(open_reader(&command.data)?)?;
    let graph = input::parse_contiguity(open_reader(&command.contiguity)?, matrix.rows())?;

    let okrug = build_okrug(&command, &matrix)?;
    let result = okrug.run(&graph, &matrix)?;

    Ok(ExecutionSummary {
        data_source: derive_data_source_name(&command.data),
        result,
    })
}

fn build_okrug(command: &RunCommand, matrix: &AttributeMatrix) -> Result<Okrug, CliError> {
    let method = match command.method {
        MethodArg::Skater => Method::Skater,
        MethodArg::Redcap => Method::Redcap {
            linkage: match command.linkage {
                LinkageArg::Single => Linkage::Single,
                LinkageArg::Complete => Linkage::Complete,
                LinkageArg::Average => Linkage::Average,
            },
            order: match command.order {
                OrderArg::FirstOrder => Order::FirstOrder,
                OrderArg::FullOrder => Order::FullOrder,
            },
        },
        MethodArg::Maxp => Method::MaxP,
    };

    let mut builder = OkrugBuilder::new()
        .with_method(method)
        .with_target_regions(command.regions)
        .with_metric(match command.metric {
            MetricArg::Euclidean => DistanceMetric::Euclidean,
            MetricArg::Manhattan => DistanceMetric::Manhattan,
        })
        .with_maxp_params(MaxPParams {
            local_search: match command.local_search {
                LocalSearchArg::Greedy => LocalSearch::Greedy,
                LocalSearchArg::Annealing => LocalSearch::SimulatedAnnealing {
                    cooling_rate: command.cooling_rate,
                },
                LocalSearchArg::Tabu => LocalSearch::Tabu {
                    tabu_length: command.tabu_length,
                },
            },
            ..MaxPParams::default()
        });

    if let Some(threshold) = command.floor_threshold {
        let weights = match command.floor_column {
            Some(column) => {
                if column >= matrix.cols() {
                    return Err(CliError::FloorColumnOutOfRange {
                        column,
                        cols: matrix.cols(),
                    });
                }
                (0..matrix.rows()).map(|row| matrix.row(row)[column]).collect()
            }
            None => vec![1.0; matrix.rows()],
        };
        builder = builder.with_floor(FloorConstraint::new(weights, threshold)?);
    }
    if let Some(seed) = command.seed {
        builder = builder.with_seed(seed);
    }
    Ok(builder.build()?)
}

fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn derive_data_source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "data".to_owned())
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Unassigned objects (undefined attribute rows) render as `-`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "regions: {}", summary.result.region_count())?;
    writeln!(writer, "objective: {}", summary.result.objective())?;
    for (index, region) in summary.result.assignments().iter().enumerate() {
        match region {
            Some(id) => writeln!(writer, "{index}\t{}", id.get())?,
            None => writeln!(writer, "{index}\t-")?,
        }
    }
    Ok(())
}
