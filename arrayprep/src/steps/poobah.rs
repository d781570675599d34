use polars::prelude::*;

use crate::data_structs::products::ProductKind;
use crate::pipeline::executor::SampleContext;

/// Empirical detection p-value of each probe's total intensity against the
/// pooled control-probe background:
/// `p = (1 + #{bg >= total}) / (1 + |bg|)`.
///
/// A sample without measured control intensities gets an all-null column;
/// downstream masking then keeps every probe.
pub(crate) fn run(ctx: &mut SampleContext) -> anyhow::Result<()> {
    let meth = ctx.f64(ProductKind::MethValues)?;
    let unmeth = ctx.f64(ProductKind::UnmethValues)?;

    let mut background = super::pooled_controls(ctx.sample().controls())?;
    background.sort_by(|a, b| a.total_cmp(b));

    let values = if background.is_empty() {
        Float64Chunked::full_null(PlSmallStr::EMPTY, meth.len())
    }
    else {
        let denominator = 1.0 + background.len() as f64;
        meth.into_iter()
            .zip(unmeth)
            .map(|(meth, unmeth)| {
                match (meth, unmeth) {
                    (Some(meth), Some(unmeth)) => {
                        let total = meth + unmeth;
                        let greater_equal = background.len()
                            - background.partition_point(|bg| *bg < total);
                        Some((1.0 + greater_equal as f64) / denominator)
                    },
                    _ => None,
                }
            })
            .collect()
    };

    ctx.insert(ProductKind::PoobahValues, values.into_series());
    Ok(())
}
