//! rsvr command line interface
//!
//! Fits an epsilon-SVR model to the built-in Mach-to-Kmax table, prints
//! the training RMSE, writes grid predictions to a TSV file, and saves
//! the trained model.

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rsvr::core::{Dataset, HyperParameters, KernelType, Result};
use rsvr::pipeline::{self, GridSpec, PipelineConfig};
use rsvr::SmoEngine;
use std::path::PathBuf;
use std::process;

/// The reference dataset: Mach number versus Kmax
const MACH: [f64; 7] = [0.3, 0.5, 0.7, 0.9, 1.1, 1.3, 1.5];
const KMAX: [f64; 7] = [14.2, 13.8, 13.1, 12.0, 10.5, 9.1, 8.0];

#[derive(Parser)]
#[command(name = "rsvr")]
#[command(about = "Epsilon-SVR regression pipeline for the Mach/Kmax dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Output predictions file
    #[arg(short, long, default_value = "predictions.tsv")]
    output: PathBuf,

    /// Output model file
    #[arg(short, long, default_value = "Kmax_SVR.model")]
    model: PathBuf,

    /// Kernel function (only rbf can be trained)
    #[arg(long, default_value = "rbf")]
    kernel: CliKernel,

    /// RBF kernel width gamma
    #[arg(long, default_value = "0.5")]
    gamma: f64,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "100.0")]
    cost: f64,

    /// Epsilon-insensitivity (zero-loss tube width)
    #[arg(long, default_value = "0.05")]
    epsilon: f64,

    /// Solver stopping tolerance
    #[arg(long, default_value = "0.001")]
    tolerance: f64,

    /// Kernel cache size in MB
    #[arg(long, default_value = "100")]
    cache_size: usize,

    /// Disable the shrinking heuristic
    #[arg(long)]
    no_shrinking: bool,

    /// Grid lower bound
    #[arg(long, default_value = "0.3")]
    grid_start: f64,

    /// Grid upper bound (inclusive)
    #[arg(long, default_value = "1.5")]
    grid_end: f64,

    /// Grid step
    #[arg(long, default_value = "0.05")]
    grid_step: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    #[value(name = "linear")]
    Linear,
    #[value(name = "polynomial")]
    Polynomial,
    #[value(name = "rbf")]
    Rbf,
    #[value(name = "sigmoid")]
    Sigmoid,
}

impl From<CliKernel> for KernelType {
    fn from(kernel: CliKernel) -> Self {
        match kernel {
            CliKernel::Linear => KernelType::Linear,
            CliKernel::Polynomial => KernelType::Polynomial,
            CliKernel::Rbf => KernelType::Rbf,
            CliKernel::Sigmoid => KernelType::Sigmoid,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dataset = Dataset::new(MACH.to_vec(), KMAX.to_vec())?;
    info!("dataset: {} samples", dataset.len());

    let config = PipelineConfig {
        params: HyperParameters {
            kernel: cli.kernel.into(),
            gamma: cli.gamma,
            c: cli.cost,
            p: cli.epsilon,
            eps: cli.tolerance,
            cache_size: cli.cache_size,
            shrinking: !cli.no_shrinking,
            ..Default::default()
        },
        grid: GridSpec {
            lower: cli.grid_start,
            upper: cli.grid_end,
            step: cli.grid_step,
        },
        predictions_path: cli.output,
        model_path: cli.model,
        ..Default::default()
    };

    let report = pipeline::run(&SmoEngine::new(), &dataset, &config)?;

    println!("Train RMSE: {}", report.training_rmse);
    info!("support vectors: {}", report.n_support_vectors);
    info!("grid predictions: {}", report.grid_rows.len());

    Ok(())
}
