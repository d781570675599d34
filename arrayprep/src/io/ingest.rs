use std::path::{
    Path,
    PathBuf,
};

use log::{
    debug,
    info,
};
use polars::prelude::*;

use crate::data_structs::arrays::ArrayType;
use crate::data_structs::sample::{
    Sample,
    SampleBatch,
};
use crate::error::{
    PipelineError,
    Result,
};

const SHEET_NAMES: [&str; 2] = ["samplesheet.csv", "sample_sheet.csv"];
/// Prefix identifying control probe rows in decoded channel tables.
const CONTROL_PREFIX: &str = "ctl";

/// Reads a batch directory into an in-memory [`SampleBatch`].
///
/// The directory holds a sample sheet (`samplesheet.csv` or
/// `sample_sheet.csv`, with at least `Sentrix_ID` and `Sentrix_Position`
/// columns) and, per sample, decoded channel tables `{id}_Grn.csv` /
/// `{id}_Red.csv` with `probe_id,intensity` columns. Control rows are
/// split off by prefix, tables are sorted by probe id, and the probe sets
/// of both channels and of every sample must agree. The array layout
/// resolves from the observed probe count unless an override is given.
pub fn read_batch_dir(
    dir: &Path,
    array_type: Option<ArrayType>,
) -> Result<SampleBatch> {
    let sheet_path = SHEET_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| {
            PipelineError::SampleSheet {
                path:    dir.join(SHEET_NAMES[0]),
                message: "sample sheet not found".to_string(),
            }
        })?;
    let sheet = read_csv(&sheet_path).map_err(|e| {
        PipelineError::SampleSheet {
            path:    sheet_path.clone(),
            message: e.to_string(),
        }
    })?;
    info!(
        "read sample sheet {} with {} samples",
        sheet_path.display(),
        sheet.height()
    );

    let sentrix_ids = string_column(&sheet, "Sentrix_ID", &sheet_path)?;
    let positions = string_column(&sheet, "Sentrix_Position", &sheet_path)?;
    let names = if sheet.get_column_names_str().contains(&"Sample_Name") {
        Some(string_column(&sheet, "Sample_Name", &sheet_path)?)
    }
    else {
        None
    };

    let mut samples = Vec::with_capacity(sheet.height());
    let mut probe_ids: Option<Series> = None;
    for row in 0..sheet.height() {
        let identifier = format!("{}_{}", sentrix_ids[row], positions[row]);
        let grn = read_channel(dir, &identifier, "Grn")?;
        let red = read_channel(dir, &identifier, "Red")?;

        if !grn.probe_ids.equals(&red.probe_ids)
            || !grn.control_ids.equals(&red.control_ids)
        {
            return Err(PipelineError::Ingest {
                sample:  identifier,
                message: "probe sets of the Grn and Red channels differ"
                    .to_string(),
            });
        }
        match &probe_ids {
            None => probe_ids = Some(grn.probe_ids.clone()),
            Some(existing) => {
                if !existing.equals(&grn.probe_ids) {
                    return Err(PipelineError::Ingest {
                        sample:  identifier,
                        message: "probe set differs from the batch probe index"
                            .to_string(),
                    });
                }
            },
        }

        let controls = DataFrame::new(vec![
            grn.control_ids
                .clone()
                .with_name("probe_id".into())
                .into_column(),
            grn.control_values
                .clone()
                .with_name("grn".into())
                .into_column(),
            red.control_values
                .clone()
                .with_name("red".into())
                .into_column(),
        ])?;
        debug!(
            "sample {}: {} probes, {} controls",
            identifier,
            grn.values.len(),
            controls.height()
        );
        samples.push(Sample::new(
            sentrix_ids[row].clone(),
            positions[row].clone(),
            names.as_ref().map(|names| names[row].clone()),
            grn.values,
            red.values,
            controls,
        ));
    }

    let probe_ids = probe_ids
        .ok_or_else(|| {
            PipelineError::SampleSheet {
                path:    sheet_path,
                message: "sample sheet contains no samples".to_string(),
            }
        })?
        .with_name("probe_id".into());
    SampleBatch::try_new(probe_ids, samples, sheet, array_type)
}

struct ChannelTable {
    probe_ids:      Series,
    values:         Series,
    control_ids:    Series,
    control_values: Series,
}

fn read_channel(
    dir: &Path,
    identifier: &str,
    channel: &str,
) -> Result<ChannelTable> {
    let path = dir.join(format!("{}_{}.csv", identifier, channel));
    let frame = read_csv(&path)
        .and_then(|frame| frame.sort(["probe_id"], SortMultipleOptions::default()))
        .map_err(|e| {
            PipelineError::Ingest {
                sample:  identifier.to_string(),
                message: format!("{}: {}", path.display(), e),
            }
        })?;

    let is_control: BooleanChunked = frame
        .column("probe_id")
        .map_err(|_| missing_column(identifier, &path, "probe_id"))?
        .str()?
        .into_iter()
        .map(|probe| {
            Some(probe.map_or(false, |probe| probe.starts_with(CONTROL_PREFIX)))
        })
        .collect();
    let controls = frame.filter(&is_control)?;
    let measures = frame.filter(&!is_control)?;

    let intensity = |frame: &DataFrame| -> Result<Series> {
        Ok(frame
            .column("intensity")
            .map_err(|_| missing_column(identifier, &path, "intensity"))?
            .cast(&DataType::Float64)?
            .as_materialized_series()
            .clone())
    };
    Ok(ChannelTable {
        probe_ids:      measures
            .column("probe_id")?
            .as_materialized_series()
            .clone(),
        values:         intensity(&measures)?,
        control_ids:    controls
            .column("probe_id")?
            .as_materialized_series()
            .clone(),
        control_values: intensity(&controls)?,
    })
}

fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn string_column(
    frame: &DataFrame,
    name: &str,
    path: &Path,
) -> Result<Vec<String>> {
    let column = frame.column(name).map_err(|_| {
        PipelineError::SampleSheet {
            path:    path.to_path_buf(),
            message: format!("required column '{}' is missing", name),
        }
    })?;
    Ok(column
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

fn missing_column(
    identifier: &str,
    path: &Path,
    column: &str,
) -> PipelineError {
    PipelineError::Ingest {
        sample:  identifier.to_string(),
        message: format!(
            "{}: required column '{}' is missing",
            path.display(),
            column
        ),
    }
}

/// Deterministic channel-table path of a sample, the inverse of what
/// [`read_batch_dir`] expects. Used by tooling that materializes demo
/// batches.
pub fn channel_path(
    dir: &Path,
    identifier: &str,
    channel: &str,
) -> PathBuf {
    dir.join(format!("{}_{}.csv", identifier, channel))
}
