//! End-to-end regression pipeline
//!
//! Drives a regression engine through the full run: build the training
//! problem, check parameters, train, evaluate training error, sweep the
//! prediction grid, write the TSV output, and persist the model. All steps
//! run strictly in sequence; every failure is fatal to the run.

use crate::core::{
    Dataset, HyperParameters, PredictionRow, RegressionEngine, RegressionModel, Result, SvrError,
};
use crate::metrics::rmse;
use crate::problem::{build_problem, feature_vector};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Tolerance added to the sweep's upper bound so the boundary grid point
/// survives floating-point step accumulation
const GRID_BOUNDARY_EPS: f64 = 1e-12;

/// Inclusive prediction grid: lower..=upper at a fixed step
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    pub lower: f64,
    pub upper: f64,
    pub step: f64,
}

impl Default for GridSpec {
    /// The reference sweep: 0.3 to 1.5 inclusive, step 0.05 (25 points)
    fn default() -> Self {
        Self {
            lower: 0.3,
            upper: 1.5,
            step: 0.05,
        }
    }
}

impl GridSpec {
    /// Materialize the grid points in ascending order.
    ///
    /// The upper bound is compared against `upper + eps` so accumulated
    /// step error never drops the last point.
    pub fn points(&self) -> Vec<f64> {
        let mut points = Vec::new();
        let mut x = self.lower;
        while x <= self.upper + GRID_BOUNDARY_EPS {
            points.push(x);
            x += self.step;
        }
        points
    }

    fn validate(&self) -> Result<()> {
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(SvrError::InvalidParameters(format!(
                "grid step must be positive, got {}",
                self.step
            )));
        }
        if !(self.lower.is_finite() && self.upper.is_finite()) || self.upper < self.lower {
            return Err(SvrError::InvalidParameters(format!(
                "invalid grid range: {}..={}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Pipeline configuration: training parameters, grid, and output targets
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub params: HyperParameters,
    pub grid: GridSpec,
    /// Path of the TSV grid-prediction output
    pub predictions_path: PathBuf,
    /// Path of the persisted model
    pub model_path: PathBuf,
    /// Header name of the input column
    pub input_column: String,
    /// Header name of the prediction column
    pub output_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            params: HyperParameters::default(),
            grid: GridSpec::default(),
            predictions_path: PathBuf::from("predictions.tsv"),
            model_path: PathBuf::from("Kmax_SVR.model"),
            input_column: "Mach".to_string(),
            output_column: "Kmax_pred".to_string(),
        }
    }
}

/// Outcome of a successful pipeline run
#[derive(Debug)]
pub struct PipelineReport {
    /// RMSE on the training samples; NaN only for degenerate metric input
    pub training_rmse: f64,
    /// Grid predictions in ascending input order
    pub grid_rows: Vec<PredictionRow>,
    /// Support vectors retained by the trained model
    pub n_support_vectors: usize,
}

/// Run the full pipeline against an engine
pub fn run<E: RegressionEngine>(
    engine: &E,
    dataset: &Dataset,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    config.grid.validate()?;

    let problem = build_problem(dataset);
    debug!("built training problem with {} samples", problem.len());

    if let Some(diagnostic) = engine.check_parameters(&problem, &config.params) {
        return Err(SvrError::InvalidParameters(diagnostic));
    }

    let model = engine.train(&problem, &config.params)?;
    info!("training completed");

    // Training error: predict every sample in dataset order
    let predictions: Vec<f64> = dataset
        .inputs()
        .iter()
        .map(|&x| model.predict(&feature_vector(x)))
        .collect();
    let training_rmse = rmse(dataset.targets(), &predictions);

    let grid_rows: Vec<PredictionRow> = config
        .grid
        .points()
        .into_iter()
        .map(|input| PredictionRow {
            input,
            predicted: model.predict(&feature_vector(input)),
        })
        .collect();

    write_predictions(&config.predictions_path, config, &grid_rows)?;
    info!(
        "wrote {} grid predictions to {:?}",
        grid_rows.len(),
        config.predictions_path
    );

    model.save(&config.model_path)?;
    info!("model saved to {:?}", config.model_path);

    Ok(PipelineReport {
        training_rmse,
        grid_rows,
        n_support_vectors: model.n_support_vectors(),
    })
}

fn write_predictions(path: &Path, config: &PipelineConfig, rows: &[PredictionRow]) -> Result<()> {
    let file = File::create(path).map_err(SvrError::IoError)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}\t{}", config.input_column, config.output_column)
        .map_err(SvrError::IoError)?;
    for row in rows {
        writeln!(writer, "{}\t{}", row.input, row.predicted).map_err(SvrError::IoError)?;
    }
    writer.flush().map_err(SvrError::IoError)?;
    Ok(())
}
