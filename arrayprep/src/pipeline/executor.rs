use anyhow::anyhow;
use indexmap::IndexMap;
use log::{
    debug,
    info,
};
use polars::prelude::*;
use rayon::prelude::*;

use crate::data_structs::products::{
    ProductKind,
    ProductStore,
};
use crate::data_structs::sample::{
    Sample,
    SampleBatch,
};
use crate::error::{
    PipelineError,
    Result,
};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::planner::ExecutionPlan;
use crate::pipeline::registry::StepKind;
use crate::steps;
use crate::utils::THREAD_POOL;

/// Per-sample working state during plan execution.
///
/// Steps read only their declared inputs from here and insert only their
/// declared outputs. Each context is exclusively owned by the worker
/// processing its sample; no state crosses sample boundaries.
pub(crate) struct SampleContext<'a> {
    sample:  &'a Sample,
    columns: IndexMap<ProductKind, Series>,
}

impl<'a> SampleContext<'a> {
    pub(crate) fn new(sample: &'a Sample) -> Self {
        Self {
            sample,
            columns: IndexMap::new(),
        }
    }

    pub(crate) fn sample(&self) -> &'a Sample {
        self.sample
    }

    pub(crate) fn insert(
        &mut self,
        kind: ProductKind,
        series: Series,
    ) {
        debug_assert!(
            !self.columns.contains_key(&kind),
            "product '{}' inserted twice",
            kind
        );
        let named = series.with_name(self.sample.identifier().into());
        self.columns.insert(kind, named);
    }

    pub(crate) fn contains(
        &self,
        kind: ProductKind,
    ) -> bool {
        self.columns.contains_key(&kind)
    }

    pub(crate) fn f64(
        &self,
        kind: ProductKind,
    ) -> anyhow::Result<&Float64Chunked> {
        let series = self
            .columns
            .get(&kind)
            .ok_or_else(|| anyhow!("product '{}' missing from working store", kind))?;
        Ok(series.f64()?)
    }

    /// Most corrected meth/unmeth pair strictly below `rung` on the
    /// intensity ladder (0 = raw, 1 = masked, 2 = noob, 3 = dye).
    pub(crate) fn best_pair_below(
        &self,
        rung: usize,
    ) -> anyhow::Result<(&Float64Chunked, &Float64Chunked)> {
        let ladder = ProductKind::intensity_ladder();
        for idx in (0..rung.min(ladder.len())).rev() {
            let [meth, unmeth] = ladder[idx];
            if self.contains(meth) {
                return Ok((self.f64(meth)?, self.f64(unmeth)?));
            }
        }
        Err(anyhow!("no meth/unmeth pair available below rung {}", rung))
    }

    fn into_columns(self) -> IndexMap<ProductKind, Series> {
        self.columns
    }
}

struct SampleOutput {
    columns: IndexMap<ProductKind, Series>,
}

/// Runs an execution plan over a batch.
///
/// Samples fan out over the shared rayon pool; the first step failure
/// aborts the batch and the partially computed results are dropped, never
/// exported. Per-sample columns merge into probe-matrix DataFrames in
/// sample-sheet order afterwards.
pub fn execute(
    plan: &ExecutionPlan,
    batch: &SampleBatch,
    config: &PipelineConfig,
) -> Result<ProductStore> {
    info!(
        "executing {} steps over {} samples ({} array)",
        plan.steps().len(),
        batch.n_samples(),
        batch.array_type()
    );

    let per_sample: Vec<SampleOutput> = THREAD_POOL.install(|| {
        batch
            .samples()
            .par_iter()
            .map(|sample| run_sample(plan, sample, config))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut store = ProductStore::new(batch.sheet().clone());
    for kind in ProductKind::ALL {
        if !kind.is_matrix() {
            continue;
        }
        let present = per_sample
            .first()
            .map(|output| output.columns.contains_key(&kind))
            .unwrap_or(false);
        if !present {
            continue;
        }
        let mut columns = Vec::with_capacity(per_sample.len() + 1);
        columns.push(batch.probe_ids().clone().into_column());
        for output in &per_sample {
            columns.push(output.columns[&kind].clone().into_column());
        }
        store.insert_matrix(kind, DataFrame::new(columns)?);
    }
    for sample in batch.samples() {
        store.insert_controls(sample.identifier(), sample.controls().clone());
    }
    Ok(store)
}

fn run_sample(
    plan: &ExecutionPlan,
    sample: &Sample,
    config: &PipelineConfig,
) -> Result<SampleOutput> {
    debug!("processing sample {}", sample.identifier());
    let mut ctx = SampleContext::new(sample);
    // Seeding happens before any planned step touches the context, so a
    // failure here is an ingestion problem, not a step failure.
    seed(&mut ctx, plan.contains(StepKind::InferChannelSwitch)).map_err(
        |source| {
            PipelineError::Ingest {
                sample:  sample.identifier(),
                message: source.to_string(),
            }
        },
    )?;

    for step in plan.steps() {
        let outcome = match step {
            // Runs during seeding, before the channels are split into the
            // meth/unmeth pair.
            StepKind::InferChannelSwitch => continue,
            StepKind::Poobah => steps::poobah::run(&mut ctx),
            StepKind::QualityMask => {
                steps::quality_mask::run(&mut ctx, config.poobah_sig)
            },
            StepKind::Noob => steps::noob::run(&mut ctx),
            StepKind::DyeBias => steps::dye_bias::run(&mut ctx),
            StepKind::ComputeBetas => steps::estimators::compute_betas(&mut ctx),
            StepKind::ComputeMValues => {
                steps::estimators::compute_m_values(&mut ctx)
            },
        };
        outcome.map_err(|source| {
            PipelineError::StepExecution {
                step:   *step,
                sample: sample.identifier(),
                source: source.into(),
            }
        })?;
    }
    Ok(SampleOutput {
        columns: ctx.into_columns(),
    })
}

/// Seeds the raw meth/unmeth pair from the sample's channels. With
/// channel-switch inference planned, flagged probes read their meth signal
/// from the red channel instead of green.
fn seed(
    ctx: &mut SampleContext,
    infer_switch: bool,
) -> anyhow::Result<()> {
    let grn = ctx.sample().grn().f64()?;
    let red = ctx.sample().red().f64()?;
    if infer_switch {
        let flags = steps::channel_switch::infer(grn, red);
        let (meth, unmeth) = steps::channel_switch::apply(grn, red, &flags);
        ctx.insert(ProductKind::ChannelSwitchFlags, flags.into_series());
        ctx.insert(ProductKind::MethValues, meth.into_series());
        ctx.insert(ProductKind::UnmethValues, unmeth.into_series());
    }
    else {
        ctx.insert(ProductKind::MethValues, grn.clone().into_series());
        ctx.insert(ProductKind::UnmethValues, red.clone().into_series());
    }
    Ok(())
}
