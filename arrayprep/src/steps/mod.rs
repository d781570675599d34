//! Correction-step implementations: pure per-sample transformations over
//! the working product columns. The orchestration core treats these as
//! black boxes with declared input/output products; the formulas here are
//! contracts of this implementation.

use polars::prelude::*;

pub(crate) mod channel_switch;
pub(crate) mod dye_bias;
pub(crate) mod estimators;
pub(crate) mod noob;
pub(crate) mod poobah;
pub(crate) mod quality_mask;


/// Pooled control intensities of one sample, both channels, nulls dropped.
pub(crate) fn pooled_controls(controls: &DataFrame) -> anyhow::Result<Vec<f64>> {
    let mut pooled = Vec::with_capacity(controls.height() * 2);
    for channel in ["grn", "red"] {
        pooled.extend(controls.column(channel)?.f64()?.into_iter().flatten());
    }
    Ok(pooled)
}

/// Non-null values of one control channel.
pub(crate) fn control_channel(
    controls: &DataFrame,
    channel: &str,
) -> anyhow::Result<Vec<f64>> {
    Ok(controls
        .column(channel)?
        .f64()?
        .into_iter()
        .flatten()
        .collect())
}
