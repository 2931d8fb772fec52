//! Integration tests for the rsvr pipeline
//!
//! These tests exercise the full pipeline end to end: dataset validation,
//! parameter checking, training, grid prediction, and persistence.

use rsvr::core::{Dataset, HyperParameters, KernelType, SvrError};
use rsvr::persistence::SerializableModel;
use rsvr::pipeline::{self, GridSpec, PipelineConfig};
use rsvr::SmoEngine;
use tempfile::TempDir;

fn reference_dataset() -> Dataset {
    Dataset::new(
        vec![0.3, 0.5, 0.7, 0.9, 1.1, 1.3, 1.5],
        vec![14.2, 13.8, 13.1, 12.0, 10.5, 9.1, 8.0],
    )
    .expect("reference dataset is valid")
}

fn config_in(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        predictions_path: dir.path().join("predictions.tsv"),
        model_path: dir.path().join("Kmax_SVR.model"),
        ..Default::default()
    }
}

#[test]
fn test_end_to_end_reference_scenario() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = config_in(&dir);

    let report = pipeline::run(&SmoEngine::new(), &reference_dataset(), &config)
        .expect("pipeline should succeed");

    // Finite non-negative training error
    assert!(report.training_rmse.is_finite());
    assert!(report.training_rmse >= 0.0);
    // A C=100 RBF fit with a 0.05 tube tracks 7 smooth points closely
    assert!(
        report.training_rmse < 1.0,
        "training RMSE unexpectedly large: {}",
        report.training_rmse
    );

    assert_eq!(report.grid_rows.len(), 25);
    assert!(report.n_support_vectors > 0);
    assert!(report.n_support_vectors <= 7);

    // TSV output: header plus one row per grid point, ascending inputs
    let text = std::fs::read_to_string(&config.predictions_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 26);
    assert_eq!(lines[0], "Mach\tKmax_pred");

    let mut previous = f64::NEG_INFINITY;
    for line in &lines[1..] {
        let mut cols = line.split('\t');
        let input: f64 = cols.next().unwrap().parse().unwrap();
        let predicted: f64 = cols.next().unwrap().parse().unwrap();
        assert!(cols.next().is_none());
        assert!(input > previous, "grid inputs must ascend");
        assert!(predicted.is_finite());
        previous = input;
    }
    // Boundary point must survive floating-point accumulation
    assert!((previous - 1.5).abs() < 1e-9);

    // Model persisted in the engine's native format
    let model_file = SerializableModel::load_from_file(&config.model_path)
        .expect("saved model should load");
    assert_eq!(model_file.kernel_type, "rbf");
    assert_eq!(model_file.metadata.n_support_vectors, report.n_support_vectors);
}

#[test]
fn test_grid_predictions_interpolate_training_targets() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let report = pipeline::run(&SmoEngine::new(), &reference_dataset(), &config).unwrap();

    // Grid points coinciding with training inputs should predict close to
    // the training targets
    let first = report.grid_rows.first().unwrap();
    let last = report.grid_rows.last().unwrap();
    assert!((first.predicted - 14.2).abs() < 1.0, "got {}", first.predicted);
    assert!((last.predicted - 8.0).abs() < 1.0, "got {}", last.predicted);
}

#[test]
fn test_single_sample_dataset_is_rejected_before_any_output() {
    let result = Dataset::new(vec![0.3], vec![14.2]);
    assert!(matches!(result, Err(SvrError::InvalidDataset(_))));
}

#[test]
fn test_invalid_kernel_pairing_aborts_before_training() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.params = HyperParameters {
        kernel: KernelType::Linear,
        ..Default::default()
    };

    let err = pipeline::run(&SmoEngine::new(), &reference_dataset(), &config).unwrap_err();
    assert!(matches!(err, SvrError::InvalidParameters(_)));

    // Aborted runs must not leave output files behind
    assert!(!config.predictions_path.exists());
    assert!(!config.model_path.exists());
}

#[test]
fn test_two_sample_dataset_trains() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let dataset = Dataset::new(vec![0.3, 1.5], vec![14.2, 8.0]).unwrap();

    let report = pipeline::run(&SmoEngine::new(), &dataset, &config).unwrap();
    assert!(report.training_rmse.is_finite());
    assert!(config.predictions_path.exists());
    assert!(config.model_path.exists());
}

#[test]
fn test_custom_grid_bounds_are_honored() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.grid = GridSpec {
        lower: 0.5,
        upper: 1.0,
        step: 0.25,
    };

    let report = pipeline::run(&SmoEngine::new(), &reference_dataset(), &config).unwrap();
    let inputs: Vec<f64> = report.grid_rows.iter().map(|r| r.input).collect();
    assert_eq!(inputs.len(), 3);
    assert!((inputs[0] - 0.5).abs() < 1e-12);
    assert!((inputs[2] - 1.0).abs() < 1e-9);
}
