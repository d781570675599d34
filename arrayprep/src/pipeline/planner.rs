use itertools::Itertools;
use log::debug;

use crate::data_structs::products::ProductKind;
use crate::error::{
    PipelineError,
    Result,
};
use crate::pipeline::config::{
    ExportSelection,
    PipelineConfig,
};
use crate::pipeline::registry::{
    produced_kinds,
    StepKind,
};

/// An ordered, dependency-validated, duplicate-free step sequence plus the
/// resolved export selection. Built once per invocation, consumed once by
/// the executor.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct ExecutionPlan {
    steps:   Vec<StepKind>,
    exports: Vec<ProductKind>,
}

impl ExecutionPlan {
    pub fn steps(&self) -> &[StepKind] {
        &self.steps
    }

    /// Resolved export list, in catalog order.
    pub fn exports(&self) -> &[ProductKind] {
        &self.exports
    }

    pub fn contains(
        &self,
        step: StepKind,
    ) -> bool {
        self.steps.contains(&step)
    }

    /// Every product this plan will leave in the store, seeded products
    /// included.
    pub fn products(&self) -> Vec<ProductKind> {
        produced_kinds(&self.steps)
    }
}

/// Resolves a configuration into an execution plan.
///
/// The requested steps are deduplicated, extended with the selected
/// estimators, closed over the producers of every hard-required product
/// and topologically sorted. Ties between steps with no dependency
/// relation break by registry declaration order, so the resulting plan is
/// independent of caller iteration order. Export names are validated here,
/// before any correction work runs.
pub fn plan(config: &PipelineConfig) -> Result<ExecutionPlan> {
    let mut requested: Vec<StepKind> = Vec::new();
    for step in &config.steps {
        if !requested.contains(step) {
            requested.push(*step);
        }
    }
    if config.betas && !requested.contains(&StepKind::ComputeBetas) {
        requested.push(StepKind::ComputeBetas);
    }
    if config.m_values && !requested.contains(&StepKind::ComputeMValues) {
        requested.push(StepKind::ComputeMValues);
    }

    // Dependency closure over hard requirements.
    loop {
        let mut missing: Vec<StepKind> = Vec::new();
        for step in &requested {
            for kind in step.requires() {
                if kind.is_seeded() {
                    continue;
                }
                let producer = StepKind::producer_of(*kind)
                    .expect("every non-seeded product has a producer");
                if !requested.contains(&producer) && !missing.contains(&producer)
                {
                    missing.push(producer);
                }
            }
        }
        if missing.is_empty() {
            break;
        }
        requested.extend(missing);
    }

    // Kahn's algorithm over declaration order. A step is ready once the
    // producer of each of its hard requirements has been emitted, and of
    // each soft requirement whose producer is planned at all.
    let mut remaining: Vec<StepKind> = StepKind::ALL
        .iter()
        .copied()
        .filter(|step| requested.contains(step))
        .collect();
    let mut ordered: Vec<StepKind> = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let ready = remaining.iter().copied().find(|step| {
            step.requires()
                .iter()
                .chain(step.soft_requires())
                .all(|kind| {
                    kind.is_seeded()
                        || StepKind::producer_of(*kind)
                            .map(|producer| !remaining.contains(&producer))
                            .unwrap_or(true)
                })
        });
        match ready {
            Some(step) => {
                remaining.retain(|other| *other != step);
                ordered.push(step);
            },
            None => return Err(PipelineError::PlanCycle { steps: remaining }),
        }
    }

    let produced = produced_kinds(&ordered);
    let exports = match &config.exports {
        ExportSelection::All => produced,
        ExportSelection::Named(kinds) => {
            for kind in kinds {
                if !produced.contains(kind) {
                    return Err(PipelineError::UnresolvedExport {
                        name: kind.as_str().to_string(),
                    });
                }
            }
            produced
                .into_iter()
                .filter(|kind| kinds.contains(kind))
                .collect()
        },
    };

    debug!(
        "resolved plan: steps=[{}] exports=[{}]",
        ordered.iter().join(", "),
        exports.iter().join(", ")
    );
    Ok(ExecutionPlan {
        steps: ordered,
        exports,
    })
}
