use std::path::Path;

use log::info;

use crate::data_structs::arrays::ArrayType;
use crate::data_structs::products::{
    ProductKind,
    ProductStore,
};
use crate::data_structs::sample::SampleBatch;
use crate::error::{
    PipelineError,
    Result,
};
use crate::io::export::ExportManager;
use crate::io::ingest::read_batch_dir;
use crate::pipeline::config::{
    Estimator,
    ExportSelection,
    PipelineConfig,
    RunOptions,
};
use crate::pipeline::executor::execute;
use crate::pipeline::planner;
use crate::pipeline::registry::StepKind;

/// Preset entry point: ingests a batch directory, expands the flag-style
/// options into the canonical configuration, processes the batch and
/// exports the selected products back into the directory.
pub fn run_pipeline<P: AsRef<Path>>(
    data_dir: P,
    options: &RunOptions,
) -> Result<ProductStore> {
    let config = options.to_config();
    run_with_config(data_dir.as_ref(), &config)
}

/// Explicit entry point: takes step names (`"all"` expands to the full
/// canonical sequence), export names (`"all"` for everything the plan
/// produces, `"csv"` for the per-sample processed tables) and an estimator
/// (`"betas"`, `"m_values"` or `"both"`).
///
/// Builds the same configuration [`run_pipeline`] expands into, so a
/// preset and its documented equivalent step list produce bit-identical
/// artifacts.
pub fn make_pipeline<P: AsRef<Path>>(
    data_dir: P,
    steps: &[&str],
    exports: &[&str],
    estimator: &str,
    array_type: Option<ArrayType>,
) -> Result<ProductStore> {
    let mut config = config_from_lists(steps, exports, estimator)?;
    config.array_type = array_type;
    run_with_config(data_dir.as_ref(), &config)
}

/// The pure processing core shared by both surfaces: plan and execute,
/// without touching the filesystem. Export validation still happens at
/// planning time, before any step runs.
pub fn process_batch(
    batch: &SampleBatch,
    config: &PipelineConfig,
) -> Result<ProductStore> {
    let plan = planner::plan(config)?;
    execute(&plan, batch, config)
}

fn run_with_config(
    dir: &Path,
    config: &PipelineConfig,
) -> Result<ProductStore> {
    let plan = planner::plan(config)?;
    let batch = read_batch_dir(dir, config.array_type)?;
    info!(
        "batch {}: {} samples on the {} array",
        dir.display(),
        batch.n_samples(),
        batch.array_type()
    );
    let store = execute(&plan, &batch, config)?;
    ExportManager::new(&store, dir, config.format, config.poobah_decimals)
        .export(plan.exports(), config.per_sample_csv)?;
    Ok(store)
}

/// Explicit-list adapter. Terminal steps listed by name behave like the
/// corresponding estimator flag; unknown names fail before anything runs.
pub(crate) fn config_from_lists(
    steps: &[&str],
    exports: &[&str],
    estimator: &str,
) -> Result<PipelineConfig> {
    let estimator = Estimator::from_name(estimator)?;
    let mut betas = estimator.betas();
    let mut m_values = estimator.m_values();

    let mut step_kinds: Vec<StepKind> = Vec::new();
    for name in steps {
        if *name == "all" {
            step_kinds.extend(StepKind::canonical());
            continue;
        }
        match StepKind::from_name(name) {
            Some(StepKind::ComputeBetas) => betas = true,
            Some(StepKind::ComputeMValues) => m_values = true,
            Some(step) => step_kinds.push(step),
            None => {
                return Err(PipelineError::UnknownStep {
                    name: name.to_string(),
                })
            },
        }
    }

    let mut per_sample_csv = false;
    let mut export_all = false;
    let mut named: Vec<ProductKind> = Vec::new();
    for name in exports {
        match *name {
            "all" => {
                export_all = true;
                per_sample_csv = true;
            },
            "csv" => per_sample_csv = true,
            name => {
                match ProductKind::from_name(name) {
                    Some(kind) => named.push(kind),
                    None => {
                        return Err(PipelineError::UnknownExport {
                            name: name.to_string(),
                        })
                    },
                }
            },
        }
    }
    let exports = if export_all {
        ExportSelection::All
    }
    else {
        ExportSelection::Named(named)
    };

    Ok(PipelineConfig {
        steps: step_kinds,
        exports,
        per_sample_csv,
        betas,
        m_values,
        ..PipelineConfig::default()
    })
}
