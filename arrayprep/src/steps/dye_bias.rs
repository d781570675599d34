use polars::prelude::*;

use crate::data_structs::products::ProductKind;
use crate::pipeline::executor::SampleContext;
use crate::utils::median;

/// Linear dye-bias correction: the red channel is rescaled so the control
/// probe medians of both channels agree. The factor defaults to 1.0 when
/// either median is undefined or the red median is zero.
pub(crate) fn run(ctx: &mut SampleContext) -> anyhow::Result<()> {
    let noob_meth = ctx.f64(ProductKind::NoobMethValues)?;
    let noob_unmeth = ctx.f64(ProductKind::NoobUnmethValues)?;

    let controls = ctx.sample().controls();
    let grn = super::control_channel(controls, "grn")?;
    let red = super::control_channel(controls, "red")?;
    let factor = match (median(&grn), median(&red)) {
        (Some(grn), Some(red)) if red > 0.0 => grn / red,
        _ => 1.0,
    };

    let dye_meth = noob_meth.clone();
    let dye_unmeth: Float64Chunked = noob_unmeth
        .into_iter()
        .map(|x| x.map(|x| x * factor))
        .collect();

    ctx.insert(ProductKind::DyeMethValues, dye_meth.into_series());
    ctx.insert(ProductKind::DyeUnmethValues, dye_unmeth.into_series());
    Ok(())
}
