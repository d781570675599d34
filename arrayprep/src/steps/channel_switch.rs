use itertools::izip;
use polars::prelude::*;

/// Ratio of red over green at which the default green-as-methylated
/// assignment is considered switched for a probe.
const SWITCH_RATIO: f64 = 10.0;

/// Flags probes whose measured red signal contradicts the default channel
/// assignment. Probes with a missing channel keep the default.
pub(crate) fn infer(
    grn: &Float64Chunked,
    red: &Float64Chunked,
) -> BooleanChunked {
    grn.into_iter()
        .zip(red)
        .map(|(grn, red)| {
            match (grn, red) {
                (Some(grn), Some(red)) => Some(red > SWITCH_RATIO * grn),
                _ => Some(false),
            }
        })
        .collect()
}

/// Applies the switch flags: flagged probes read their meth signal from
/// the red channel and unmeth from green.
pub(crate) fn apply(
    grn: &Float64Chunked,
    red: &Float64Chunked,
    flags: &BooleanChunked,
) -> (Float64Chunked, Float64Chunked) {
    let meth = izip!(grn, red, flags)
        .map(|(grn, red, flag)| if flag == Some(true) { red } else { grn })
        .collect();
    let unmeth = izip!(grn, red, flags)
        .map(|(grn, red, flag)| if flag == Some(true) { grn } else { red })
        .collect();
    (meth, unmeth)
}
