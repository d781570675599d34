use std::fs::{
    create_dir_all,
    File,
};
use std::path::{
    Path,
    PathBuf,
};

use log::{
    debug,
    info,
};
use polars::prelude::*;

use crate::data_structs::products::{
    ProductKind,
    ProductStore,
};
use crate::error::{
    PipelineError,
    Result,
};
use crate::pipeline::config::ExportFormat;

/// Writes products of a finished run to deterministic paths under the
/// batch directory: one `{product}.{ext}` artifact per requested product,
/// plus one `{sentrix_id}/{sample_id}_processed.csv` table per sample when
/// asked for.
///
/// Every requested name is validated against the store before the first
/// byte is written, and writing truncates, so re-exporting the same store
/// yields byte-identical artifacts.
pub struct ExportManager<'a> {
    store:           &'a ProductStore,
    dir:             PathBuf,
    format:          ExportFormat,
    poobah_decimals: u32,
}

impl<'a> ExportManager<'a> {
    pub fn new(
        store: &'a ProductStore,
        dir: &Path,
        format: ExportFormat,
        poobah_decimals: u32,
    ) -> Self {
        Self {
            store,
            dir: dir.to_path_buf(),
            format,
            poobah_decimals,
        }
    }

    pub fn export(
        &self,
        requested: &[ProductKind],
        per_sample_csv: bool,
    ) -> Result<()> {
        for kind in requested {
            if !self.store.contains(*kind) {
                return Err(PipelineError::UnresolvedExport {
                    name: kind.as_str().to_string(),
                });
            }
        }
        create_dir_all(&self.dir)?;

        for kind in requested {
            match kind {
                ProductKind::ControlProbes => self.write_controls()?,
                ProductKind::SampleSheetMetaData => {
                    self.write_frame(self.store.sheet().clone(), kind.as_str())?
                },
                ProductKind::PoobahValues => {
                    self.write_frame(self.rounded_poobah()?, kind.as_str())?
                },
                _ => {
                    let frame = self.store.matrix(*kind).ok_or_else(|| {
                        PipelineError::UnresolvedExport {
                            name: kind.as_str().to_string(),
                        }
                    })?;
                    self.write_frame(frame.clone(), kind.as_str())?
                },
            }
        }
        if per_sample_csv {
            self.write_per_sample()?;
        }
        info!(
            "exported {} products to {}",
            requested.len(),
            self.dir.display()
        );
        Ok(())
    }

    fn write_frame(
        &self,
        mut frame: DataFrame,
        name: &str,
    ) -> Result<()> {
        let path = self
            .dir
            .join(format!("{}.{}", name, self.format.extension()));
        debug!("writing {}", path.display());
        let mut file = File::create(&path)?;
        match self.format {
            ExportFormat::Csv => {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut frame)?
            },
            ExportFormat::Ipc => IpcWriter::new(&mut file).finish(&mut frame)?,
        }
        Ok(())
    }

    /// P-values rounded to the configured precision, on export only; the
    /// in-memory product keeps full precision.
    fn rounded_poobah(&self) -> Result<DataFrame> {
        let mut frame = self
            .store
            .matrix(ProductKind::PoobahValues)
            .ok_or_else(|| {
                PipelineError::UnresolvedExport {
                    name: ProductKind::PoobahValues.as_str().to_string(),
                }
            })?
            .clone();
        let sample_columns: Vec<String> = frame
            .get_column_names_str()
            .into_iter()
            .filter(|name| *name != "probe_id")
            .map(str::to_string)
            .collect();
        for name in sample_columns {
            let rounded = frame
                .column(&name)?
                .as_materialized_series()
                .round(self.poobah_decimals)?;
            frame.with_column(rounded)?;
        }
        Ok(frame)
    }

    /// Control tables stacked into one long frame, `sample_id` first, in
    /// sample-sheet order.
    fn write_controls(&self) -> Result<()> {
        let mut stacked: Option<DataFrame> = None;
        for (sample_id, controls) in self.store.controls() {
            let mut frame = controls.clone();
            let ids = Series::new(
                "sample_id".into(),
                vec![sample_id.clone(); frame.height()],
            );
            frame.insert_column(0, ids)?;
            stacked = Some(match stacked {
                Some(acc) => acc.vstack(&frame)?,
                None => frame,
            });
        }
        // Same schema whether or not any sample carried control rows.
        let frame = match stacked {
            Some(frame) => frame,
            None => {
                df!(
                    "sample_id" => Vec::<String>::new(),
                    "probe_id" => Vec::<String>::new(),
                    "grn" => Vec::<f64>::new(),
                    "red" => Vec::<f64>::new(),
                )?
            },
        };
        self.write_frame(frame, ProductKind::ControlProbes.as_str())
    }

    /// One processed CSV per sample: `probe_id` plus that sample's column
    /// of every probe-matrix product in the store, headers named after the
    /// products.
    fn write_per_sample(&self) -> Result<()> {
        for sample_id in self.store.sample_ids() {
            let mut columns: Vec<Column> = Vec::new();
            for kind in self.store.kinds() {
                if !kind.is_matrix() {
                    continue;
                }
                let matrix = self.store.matrix(kind).ok_or_else(|| {
                    PipelineError::UnresolvedExport {
                        name: kind.as_str().to_string(),
                    }
                })?;
                if columns.is_empty() {
                    columns.push(matrix.column("probe_id")?.clone());
                }
                let mut column = matrix.column(sample_id)?.clone();
                column.rename(kind.as_str().into());
                columns.push(column);
            }
            if columns.is_empty() {
                // Nothing beyond the seeded per-sample tables to write.
                continue;
            }
            let mut frame = DataFrame::new(columns)?;

            let sentrix_id = sample_id
                .rsplit_once('_')
                .map(|(sentrix, _)| sentrix)
                .unwrap_or(sample_id);
            let subdir = self.dir.join(sentrix_id);
            create_dir_all(&subdir)?;
            let path = subdir.join(format!("{}_processed.csv", sample_id));
            debug!("writing {}", path.display());
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut frame)?;
        }
        Ok(())
    }
}
