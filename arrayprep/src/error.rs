use std::path::PathBuf;

use polars::error::PolarsError;
use thiserror::Error;

use crate::pipeline::registry::StepKind;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure surface of the processing core.
///
/// Classification failures (array resolution) and configuration failures
/// (unknown names, unsatisfiable plans) are raised before any correction
/// work runs. Execution failures abort the whole batch; nothing is exported
/// after one.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown array type: no layout matches {probe_count} probes")]
    UnknownArray { probe_count: usize },

    #[error("unsupported array type: {name}")]
    UnsupportedArray { name: String },

    #[error("unknown processing step '{name}'")]
    UnknownStep { name: String },

    #[error("unknown export product '{name}'")]
    UnknownExport { name: String },

    #[error("unknown estimator '{name}' (expected 'betas', 'm_values' or 'both')")]
    UnknownEstimator { name: String },

    #[error("export '{name}' is not produced by the resolved plan")]
    UnresolvedExport { name: String },

    #[error("cyclic step dependencies among {steps:?}")]
    PlanCycle { steps: Vec<StepKind> },

    #[error("step '{step}' failed for sample '{sample}': {source}")]
    StepExecution {
        step:   StepKind,
        sample: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("sample sheet {}: {message}", path.display())]
    SampleSheet { path: PathBuf, message: String },

    #[error("sample '{sample}': {message}")]
    Ingest { sample: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
