//! # arrayprep
//!
//! `arrayprep` turns raw per-sample methylation-array intensity readings
//! into corrected, analysis-ready numeric matrices (methylated and
//! unmethylated intensities, beta values, M-values) through a configurable
//! sequence of signal-correction steps.
//!
//! The crate is built around a small orchestration core:
//!
//! * **Array resolution** — [`ArrayType`] maps the raw probe count observed
//!   in a decoded intensity table to one of the supported physical layouts,
//!   carrying the layout's manifest constants directly on the variant.
//! * **Step registry** — [`StepKind`] declares, for every correction step,
//!   which named data products it requires and which it produces.
//! * **Planner** — resolves a [`PipelineConfig`] into a validated,
//!   dependency-ordered [`ExecutionPlan`], independent of the order steps
//!   were requested in.
//! * **Executor** — runs the plan per sample on a shared rayon pool and
//!   merges per-sample results into batch-wide matrices in a
//!   [`ProductStore`].
//! * **Export manager** — writes requested products to deterministic paths
//!   under the batch directory, as CSV or Arrow IPC.
//!
//! Two entry surfaces exist: [`run_pipeline`] takes preset-style flags
//! ([`RunOptions`]), [`make_pipeline`] takes an explicit step list. Both
//! expand into the same [`PipelineConfig`] and share one planner/executor
//! path, so logically equivalent invocations produce bit-identical
//! artifacts.
//!
//! Number of worker threads can be configured with the
//! `ARRAYPREP_NUM_THREADS` environment variable.
//!
//! ## Usage
//!
//! ```no_run
//! use arrayprep::prelude::*;
//!
//! fn main() -> arrayprep::error::Result<()> {
//!     // Preset surface: sesame-style processing with beta values.
//!     let options = RunOptions::default()
//!         .with_sesame(true)
//!         .with_betas(true)
//!         .with_export_csv(true);
//!     let store = run_pipeline("data/GSE69852", &options)?;
//!     println!("{} products", store.kinds().len());
//!
//!     // Explicit surface: the equivalent step list.
//!     let store = make_pipeline(
//!         "data/GSE69852",
//!         &["infer_channel_switch", "poobah", "quality_mask", "noob", "dye_bias"],
//!         &["all"],
//!         "betas",
//!         None,
//!     )?;
//!     println!("{} products", store.kinds().len());
//!     Ok(())
//! }
//! ```

pub mod data_structs;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod prelude;
mod steps;
pub mod utils;

pub use crate::data_structs::arrays::ArrayType;
pub use crate::data_structs::products::{
    ProductKind,
    ProductStore,
};
pub use crate::data_structs::sample::{
    Sample,
    SampleBatch,
};
pub use crate::error::PipelineError;
pub use crate::pipeline::config::{
    PipelineConfig,
    RunOptions,
};
pub use crate::pipeline::planner::ExecutionPlan;
pub use crate::pipeline::registry::StepKind;
pub use crate::pipeline::{
    make_pipeline,
    process_batch,
    run_pipeline,
};
