use polars::prelude::*;

use crate::data_structs::products::ProductKind;
use crate::pipeline::executor::SampleContext;

/// Nulls out probes whose detection p-value exceeds the significance
/// threshold, producing masked copies of the raw intensity pair. Probes
/// without a p-value cannot be assessed and keep their intensities.
pub(crate) fn run(
    ctx: &mut SampleContext,
    poobah_sig: f64,
) -> anyhow::Result<()> {
    let poobah = ctx.f64(ProductKind::PoobahValues)?;
    let meth = ctx.f64(ProductKind::MethValues)?;
    let unmeth = ctx.f64(ProductKind::UnmethValues)?;

    let mask = |values: &Float64Chunked| -> Float64Chunked {
        values
            .into_iter()
            .zip(poobah)
            .map(|(value, p)| {
                match p {
                    Some(p) if p > poobah_sig => None,
                    _ => value,
                }
            })
            .collect()
    };
    let masked_meth = mask(meth);
    let masked_unmeth = mask(unmeth);

    ctx.insert(ProductKind::MaskedMethValues, masked_meth.into_series());
    ctx.insert(ProductKind::MaskedUnmethValues, masked_unmeth.into_series());
    Ok(())
}
