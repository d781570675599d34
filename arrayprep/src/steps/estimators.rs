use polars::prelude::*;

use crate::data_structs::products::ProductKind;
use crate::pipeline::executor::SampleContext;

/// Pseudocount stabilizing the beta denominator.
const BETA_OFFSET: f64 = 100.0;
/// Number of rungs on the intensity ladder; estimators read the best pair
/// present anywhere on it.
const TOP_RUNG: usize = 4;

/// `beta = meth / (meth + unmeth + 100)` over the most corrected available
/// pair. Values lie in [0, 1]; nulls propagate.
pub(crate) fn compute_betas(ctx: &mut SampleContext) -> anyhow::Result<()> {
    let (meth, unmeth) = ctx.best_pair_below(TOP_RUNG)?;
    let betas: Float64Chunked = meth
        .into_iter()
        .zip(unmeth)
        .map(|(meth, unmeth)| {
            match (meth, unmeth) {
                (Some(meth), Some(unmeth)) => {
                    Some(meth / (meth + unmeth + BETA_OFFSET))
                },
                _ => None,
            }
        })
        .collect();
    ctx.insert(ProductKind::BetaValues, betas.into_series());
    Ok(())
}

/// `m = log2((meth + 1) / (unmeth + 1))` over the most corrected available
/// pair. Nulls propagate.
pub(crate) fn compute_m_values(ctx: &mut SampleContext) -> anyhow::Result<()> {
    let (meth, unmeth) = ctx.best_pair_below(TOP_RUNG)?;
    let m_values: Float64Chunked = meth
        .into_iter()
        .zip(unmeth)
        .map(|(meth, unmeth)| {
            match (meth, unmeth) {
                (Some(meth), Some(unmeth)) => {
                    Some(((meth + 1.0) / (unmeth + 1.0)).log2())
                },
                _ => None,
            }
        })
        .collect();
    ctx.insert(ProductKind::MValues, m_values.into_series());
    Ok(())
}
