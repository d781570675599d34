use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use arrayprep::prelude::*;
use clap::{
    Args,
    ValueEnum,
};
use console::style;
use log::info;

use crate::utils::{
    init_spinner,
    CliArrayType,
    UtilsArgs,
};

#[derive(Debug, Copy, Clone, ValueEnum)]
pub(crate) enum CliExportFormat {
    Csv,
    Ipc,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(value: CliExportFormat) -> Self {
        match value {
            CliExportFormat::Csv => ExportFormat::Csv,
            CliExportFormat::Ipc => ExportFormat::Ipc,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ProcessArgs {
    #[arg(
        required = true,
        help = "Path to a decoded batch directory (sample sheet plus \
                per-sample Grn/Red channel tables)."
    )]
    data_dir: PathBuf,

    #[arg(
        long,
        default_value_t = false,
        help = "Run the full sesame-equivalent correction sequence."
    )]
    sesame: bool,

    #[arg(long, default_value_t = false, help = "Compute beta values.")]
    betas: bool,

    #[arg(long, default_value_t = false, help = "Compute M-values.")]
    m_values: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Compute detection p-values (implied by --sesame)."
    )]
    poobah: bool,

    #[arg(
        long,
        default_value_t = false,
        help_heading = "EXPORT ARGS",
        help = "Export the detection p-value matrix."
    )]
    export_poobah: bool,

    #[arg(
        long,
        default_value_t = false,
        help_heading = "EXPORT ARGS",
        help = "Export the uncorrected meth/unmeth intensity matrices."
    )]
    save_uncorrected: bool,

    #[arg(
        long,
        default_value_t = false,
        help_heading = "EXPORT ARGS",
        help = "Export the control probe intensities."
    )]
    save_control: bool,

    #[arg(
        long = "csv",
        default_value_t = false,
        help_heading = "EXPORT ARGS",
        help = "Write one processed CSV table per sample."
    )]
    export_csv: bool,

    #[arg(
        long,
        help = "Detection p-value significance threshold for quality masking."
    )]
    poobah_sig: Option<f64>,

    #[arg(long, help = "Decimal places of exported p-values.")]
    poobah_decimals: Option<u32>,

    #[arg(
        short,
        long,
        value_enum,
        default_value_t = CliExportFormat::Csv,
        help_heading = "EXPORT ARGS",
        help = "On-disk format of exported matrices."
    )]
    format: CliExportFormat,

    #[arg(
        long,
        value_enum,
        help = "Skip array resolution and force this array layout."
    )]
    array_type: Option<CliArrayType>,
}

impl ProcessArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        if !self.data_dir.is_dir() {
            eprintln!(
                "Path {} is not a directory.",
                style(self.data_dir.display()).red()
            );
            exit(-1);
        }

        let options = RunOptions {
            sesame: self.sesame,
            betas: self.betas,
            m_values: self.m_values,
            poobah: self.poobah,
            export_poobah: self.export_poobah,
            save_uncorrected: self.save_uncorrected,
            save_control: self.save_control,
            export_csv: self.export_csv,
            poobah_sig: self.poobah_sig,
            poobah_decimals: self.poobah_decimals,
            format: self.format.into(),
            array_type: self.array_type.map(Into::into),
        };

        let spinner = utils.progress().then(init_spinner).transpose()?;
        let store = run_pipeline(&self.data_dir, &options).with_context(|| {
            format!("processing batch {}", self.data_dir.display())
        })?;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        info!(
            "products: {}",
            store
                .kinds()
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        eprintln!(
            "Processed {} samples into {}.",
            style(store.sample_ids().len()).green(),
            style(self.data_dir.display()).green()
        );
        Ok(())
    }
}
