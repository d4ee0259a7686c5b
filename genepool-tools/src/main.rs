// SPDX-License-Identifier: AGPL-3.0-or-later
// GenePool - Partitioned k-NN Ensemble Classifier
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! GenePool CLI
//!
//! Partitioned k-NN ensemble classification over CSV datasets.
//!
//! ## Usage
//!
//! ```bash
//! # Prepare data
//! genepool prep split iris.csv
//! genepool prep assign iris.csv --groups 8
//!
//! # Evaluate an ensemble of 8 creatures
//! genepool run --train train_iris.csv --test test_iris.csv --header --creatures 8
//!
//! # Header info
//! genepool attributes iris.csv
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use genepool_core::{DEFAULT_MAX_LINE_BYTES, GENEPOOL_VERSION, PartitionSchedule, RunConfig};
use genepool_index::{Creature, PartitionConfig, Partitioner};
use genepool_tools::io::{IngestOptions, count_attributes, header_len, ingest_csv, read_attributes};
use genepool_tools::prep::{DEFAULT_TEST_FRACTION, assign_groups, split_dataset};
use genepool_tools::report::evaluate;

/// GenePool - partitioned k-NN ensemble classifier
#[derive(Parser)]
#[command(name = "genepool")]
#[command(about = "Partition a labeled dataset into creatures and classify with k-NN")]
#[command(version = GENEPOOL_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition a training set and evaluate the ensemble on a test set
    Run {
        /// Training data (label first, then features)
        #[arg(long)]
        train: PathBuf,

        /// Test data, same layout as the training data
        #[arg(long)]
        test: PathBuf,

        /// JSON run configuration; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Features per record (inferred from the first line if omitted)
        #[arg(short = 'f', long)]
        features: Option<usize>,

        /// Number of creatures
        #[arg(long)]
        creatures: Option<usize>,

        /// Slots per creature (defaults to an even share of the training set)
        #[arg(long)]
        capacity: Option<usize>,

        /// Neighbors consulted per classification
        #[arg(short)]
        k: Option<usize>,

        /// Seed for partitioning
        #[arg(short, long)]
        seed: Option<u64>,

        /// Fill creatures in parallel (placement may vary between runs)
        #[arg(long)]
        concurrent: bool,

        /// Number of threads (0 = auto)
        #[arg(short = 't', long)]
        threads: Option<usize>,

        /// Input files start with an attribute header
        #[arg(long)]
        header: bool,

        /// Read at most this many training records
        #[arg(long)]
        limit: Option<usize>,

        /// Longest accepted input line, in bytes
        #[arg(long)]
        max_line_bytes: Option<usize>,
    },

    /// Show the attribute header of a file
    Attributes {
        /// Input CSV file
        input: PathBuf,
    },

    /// Prepare datasets for a run
    Prep {
        #[command(subcommand)]
        command: PrepCommands,
    },
}

#[derive(Subcommand)]
enum PrepCommands {
    /// Stratified train/test split, writing train_<name> and test_<name>
    Split {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Share of each class held out for testing
        #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
        test_fraction: f64,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Shuffle and tag rows with a leading __gene__ group column
    Assign {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Number of groups
        #[arg(short, long)]
        groups: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

/// Settings given on the command line for `run`.
struct RunArgs {
    train: PathBuf,
    test: PathBuf,
    config: Option<PathBuf>,
    features: Option<usize>,
    creatures: Option<usize>,
    capacity: Option<usize>,
    k: Option<usize>,
    seed: Option<u64>,
    concurrent: bool,
    threads: Option<usize>,
    header: bool,
    limit: Option<usize>,
    max_line_bytes: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Run {
            train,
            test,
            config,
            features,
            creatures,
            capacity,
            k,
            seed,
            concurrent,
            threads,
            header,
            limit,
            max_line_bytes,
        } => run(RunArgs {
            train,
            test,
            config,
            features,
            creatures,
            capacity,
            k,
            seed,
            concurrent,
            threads,
            header,
            limit,
            max_line_bytes,
        }),
        Commands::Attributes { input } => show_attributes(&input),
        Commands::Prep { command } => match command {
            PrepCommands::Split {
                input,
                test_fraction,
                seed,
                out_dir,
            } => {
                let summary = split_dataset(&input, test_fraction, seed, out_dir.as_deref())
                    .with_context(|| format!("Failed to split {}", input.display()))?;
                println!(
                    "Wrote {} ({} rows) and {} ({} rows)",
                    summary.train_path.display(),
                    summary.train_rows,
                    summary.test_path.display(),
                    summary.test_rows
                );
                Ok(())
            }
            PrepCommands::Assign {
                input,
                groups,
                seed,
                out_dir,
            } => {
                let summary = assign_groups(&input, groups, seed, out_dir.as_deref())
                    .with_context(|| format!("Failed to assign groups in {}", input.display()))?;
                println!(
                    "Wrote {} ({} rows in {} groups)",
                    summary.output_path.display(),
                    summary.rows,
                    summary.groups
                );
                Ok(())
            }
        },
    }
}

/// File configuration with command-line overrides applied.
fn resolve_config(args: &RunArgs) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(v) = args.creatures {
        cfg.num_creatures = v;
    }
    if let Some(v) = args.k {
        cfg.k = v;
    }
    if let Some(v) = args.seed {
        cfg.seed = v;
    }
    if let Some(v) = args.threads {
        cfg.threads = v;
    }
    if let Some(v) = args.max_line_bytes {
        cfg.max_line_bytes = v;
    }
    if args.concurrent {
        cfg.schedule = PartitionSchedule::Concurrent;
    }
    if args.header {
        cfg.has_header = true;
    }

    cfg.num_features = match (args.features, &args.config) {
        (Some(v), _) => v,
        (None, Some(_)) => cfg.num_features,
        (None, None) => {
            let columns = count_attributes(&args.train, cfg.max_line_bytes)
                .context("Failed to infer the number of features")?;
            columns - 1
        }
    };
    if let Some(v) = args.capacity {
        cfg.creature_capacity = v;
    }
    Ok(cfg)
}

fn run(args: RunArgs) -> Result<()> {
    let mut cfg = resolve_config(&args)?;

    if cfg.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.threads)
            .build_global()
            .ok();
    }

    let start = Instant::now();
    let mut opts = IngestOptions::from(&cfg);
    opts.limit = args.limit;
    let train = ingest_csv(&args.train, &opts)
        .with_context(|| format!("Failed to ingest {}", args.train.display()))?;
    opts.limit = None;
    let test = ingest_csv(&args.test, &opts)
        .with_context(|| format!("Failed to ingest {}", args.test.display()))?;
    let ingest_time = start.elapsed();

    if train.is_empty() {
        bail!("No training records in {}", args.train.display());
    }
    if args.capacity.is_none() && args.config.is_none() {
        cfg.creature_capacity = train.len().div_ceil(cfg.num_creatures.max(1));
    }
    cfg.validate_for(&train).context("Invalid run configuration")?;

    info!(
        version = GENEPOOL_VERSION,
        creatures = cfg.num_creatures,
        capacity = cfg.creature_capacity,
        k = cfg.k,
        seed = cfg.seed,
        "Run configuration"
    );

    let partition_start = Instant::now();
    let mut creatures = Creature::uniform(cfg.num_creatures, cfg.creature_capacity);
    let stats = Partitioner::new(PartitionConfig::from(&cfg))
        .fill_from_store(&mut creatures, &train)
        .context("Failed to partition training genes")?;
    let partition_time = partition_start.elapsed();

    let classify_start = Instant::now();
    let report = evaluate(&train, &test, &creatures, cfg.k).context("Classification failed")?;
    let classify_time = classify_start.elapsed();

    println!("{report}");
    eprintln!();
    eprintln!(
        "usage per gene: {}..{} ({} random slots, {} probes)",
        stats.min_usage, stats.max_usage, stats.random_slots, stats.probes
    );
    eprintln!(
        "ingest {:.2?}, partition {:.2?}, classify {:.2?}",
        ingest_time, partition_time, classify_time
    );
    Ok(())
}

fn show_attributes(input: &Path) -> Result<()> {
    let attributes = read_attributes(input, DEFAULT_MAX_LINE_BYTES)
        .with_context(|| format!("Failed to read header of {}", input.display()))?;
    let bytes = header_len(input, DEFAULT_MAX_LINE_BYTES)?;

    println!("{} attributes ({} header bytes)", attributes.len(), bytes);
    for (i, name) in attributes.iter().enumerate() {
        println!("{:>4}  {}", i, name);
    }
    Ok(())
}
