use polars::prelude::*;
use statrs::distribution::{
    Continuous,
    ContinuousCDF,
    Normal,
};
use statrs::statistics::Statistics;

use crate::data_structs::products::ProductKind;
use crate::pipeline::executor::SampleContext;

/// Offset added to every corrected intensity, matching the reference
/// normal-exponential implementation.
const OFFSET: f64 = 15.0;
/// Background deviation below which the normal model degenerates.
const MIN_SD: f64 = 1e-8;

/// Normal-background correction of the best intensity pair below the noob
/// rung (the masked pair when quality masking ran, the raw pair
/// otherwise).
///
/// Background mean and deviation come from the sample's pooled control
/// intensities; each intensity `x` becomes
/// `sd * (z + pdf(z) / cdf(z)) + 15` with `z = (x - mean) / sd`, which is
/// strictly positive on non-null input. A degenerate background falls back
/// to plain mean subtraction clamped at zero. Nulls propagate.
pub(crate) fn run(ctx: &mut SampleContext) -> anyhow::Result<()> {
    let (meth, unmeth) = ctx.best_pair_below(2)?;

    let background = super::pooled_controls(ctx.sample().controls())?;
    let mean = if background.is_empty() {
        0.0
    }
    else {
        (&background).mean()
    };
    let sd = if background.len() < 2 {
        0.0
    }
    else {
        (&background).std_dev()
    };

    let correct: Box<dyn Fn(f64) -> f64> = if sd <= MIN_SD {
        Box::new(move |x: f64| (x - mean).max(0.0) + OFFSET)
    }
    else {
        let normal = Normal::new(0.0, 1.0)?;
        Box::new(move |x: f64| {
            let z = (x - mean) / sd;
            let cdf = normal.cdf(z);
            if cdf <= f64::EPSILON {
                (x - mean).max(0.0) + OFFSET
            }
            else {
                sd * (z + normal.pdf(z) / cdf) + OFFSET
            }
        })
    };

    let noob_meth: Float64Chunked =
        meth.into_iter().map(|x| x.map(&correct)).collect();
    let noob_unmeth: Float64Chunked =
        unmeth.into_iter().map(|x| x.map(&correct)).collect();

    ctx.insert(ProductKind::NoobMethValues, noob_meth.into_series());
    ctx.insert(ProductKind::NoobUnmethValues, noob_unmeth.into_series());
    Ok(())
}
