use polars::prelude::*;

use crate::data_structs::arrays::ArrayType;
use crate::error::{
    PipelineError,
    Result,
};

/// A single array scan: identity from the sample sheet, raw green/red
/// channel intensities aligned to the batch probe index, and the scan's
/// control probe table (`probe_id`/`grn`/`red`).
///
/// Channel series are never overwritten once ingested; corrected views
/// live in the product store under their own names.
#[derive(Debug, Clone)]
pub struct Sample {
    sentrix_id:       String,
    sentrix_position: String,
    sample_name:      Option<String>,
    grn:              Series,
    red:              Series,
    controls:         DataFrame,
}

impl Sample {
    pub fn new(
        sentrix_id: String,
        sentrix_position: String,
        sample_name: Option<String>,
        grn: Series,
        red: Series,
        controls: DataFrame,
    ) -> Self {
        Self {
            sentrix_id,
            sentrix_position,
            sample_name,
            grn,
            red,
            controls,
        }
    }

    /// Canonical sample identifier, `{sentrix_id}_{sentrix_position}`.
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.sentrix_id, self.sentrix_position)
    }

    pub fn sentrix_id(&self) -> &str {
        &self.sentrix_id
    }

    pub fn sentrix_position(&self) -> &str {
        &self.sentrix_position
    }

    pub fn sample_name(&self) -> Option<&str> {
        self.sample_name.as_deref()
    }

    pub fn grn(&self) -> &Series {
        &self.grn
    }

    pub fn red(&self) -> &Series {
        &self.red
    }

    pub fn controls(&self) -> &DataFrame {
        &self.controls
    }

    /// Control table with the right schema and no rows, for scans without
    /// control probes.
    pub fn empty_controls() -> DataFrame {
        df!(
            "probe_id" => Vec::<String>::new(),
            "grn" => Vec::<f64>::new(),
            "red" => Vec::<f64>::new(),
        )
        .expect("static control schema")
    }
}

/// A batch of scans sharing one sorted probe index and one resolved array
/// layout, in sample-sheet order.
#[derive(Debug, Clone)]
pub struct SampleBatch {
    probe_ids:  Series,
    array_type: ArrayType,
    samples:    Vec<Sample>,
    sheet:      DataFrame,
}

impl SampleBatch {
    /// Validates channel alignment and resolves the array layout from the
    /// observed probe count (measurement plus control rows) unless an
    /// override is given.
    pub fn try_new(
        probe_ids: Series,
        samples: Vec<Sample>,
        sheet: DataFrame,
        array_type: Option<ArrayType>,
    ) -> Result<Self> {
        for sample in &samples {
            if sample.grn().len() != probe_ids.len()
                || sample.red().len() != probe_ids.len()
            {
                return Err(PipelineError::Ingest {
                    sample:  sample.identifier(),
                    message: format!(
                        "channel lengths {}/{} do not match the batch probe \
                         index of {}",
                        sample.grn().len(),
                        sample.red().len(),
                        probe_ids.len()
                    ),
                });
            }
        }
        let array_type = match array_type {
            Some(array_type) => array_type,
            None => {
                let n_controls = samples
                    .first()
                    .map(|sample| sample.controls().height())
                    .unwrap_or(0);
                ArrayType::from_probe_count(probe_ids.len() + n_controls)?
            },
        };
        Ok(Self {
            probe_ids,
            array_type,
            samples,
            sheet,
        })
    }

    pub fn probe_ids(&self) -> &Series {
        &self.probe_ids
    }

    pub fn array_type(&self) -> ArrayType {
        self.array_type
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sheet(&self) -> &DataFrame {
        &self.sheet
    }
}
