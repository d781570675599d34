use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use arrayprep::prelude::*;
use clap::Args;
use console::style;
use log::info;

use crate::utils::{
    init_spinner,
    CliArrayType,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct PipelineArgs {
    #[arg(
        required = true,
        help = "Path to a decoded batch directory (sample sheet plus \
                per-sample Grn/Red channel tables)."
    )]
    data_dir: PathBuf,

    #[arg(
        short,
        long,
        num_args = 1..,
        default_value = "all",
        help = "Correction steps to run, in any order. 'all' selects the \
                full canonical sequence."
    )]
    steps: Vec<String>,

    #[arg(
        short,
        long,
        num_args = 0..,
        help = "Products to export by name, 'all' for every product the \
                plan produces, 'csv' for per-sample processed tables."
    )]
    exports: Vec<String>,

    #[arg(
        long,
        default_value = "betas",
        help = "Terminal estimator: betas, m_values or both."
    )]
    estimator: String,

    #[arg(
        long,
        value_enum,
        help = "Skip array resolution and force this array layout."
    )]
    array_type: Option<CliArrayType>,
}

impl PipelineArgs {
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

        let steps: Vec<&str> = self.steps.iter().map(String::as_str).collect();
        let exports: Vec<&str> =
            self.exports.iter().map(String::as_str).collect();
        info!("requested steps: {}", steps.join(", "));

        let spinner = utils.progress().then(init_spinner).transpose()?;
        let store = make_pipeline(
            &self.data_dir,
            &steps,
            &exports,
            &self.estimator,
            self.array_type.map(Into::into),
        )
        .with_context(|| {
            format!("processing batch {}", self.data_dir.display())
        })?;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        eprintln!(
            "Processed {} samples into {}.",
            style(store.sample_ids().len()).green(),
            style(self.data_dir.display()).green()
        );
        Ok(())
    }
}
