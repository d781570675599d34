use arrayprep::prelude::ArrayType;
use clap::{
    Args,
    ValueEnum,
};
use indicatif::{
    ProgressBar,
    ProgressStyle,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        long,
        default_value_t = 1,
        help_heading = "UTILS",
        help = "Number of threads to use. 0 takes every available core."
    )]
    threads: usize,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help_heading = "UTILS",
        help = "Verbosity level. -v for info, -vv for debug."
    )]
    verbose: u8,

    #[arg(
        long,
        default_value_t = true,
        help_heading = "UTILS",
        help = "Display progress."
    )]
    progress: bool,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", level);
        }
        pretty_env_logger::try_init()?;

        if self.threads > 0 {
            std::env::set_var("ARRAYPREP_NUM_THREADS", self.threads.to_string());
            std::env::set_var("POLARS_MAX_THREADS", self.threads.to_string());
        }
        Ok(())
    }

    pub fn progress(&self) -> bool {
        self.progress
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub(crate) enum CliArrayType {
    Custom,
    #[value(name = "450k")]
    Hm450k,
    Epic,
    EpicPlus,
}

impl From<CliArrayType> for ArrayType {
    fn from(value: CliArrayType) -> Self {
        match value {
            CliArrayType::Custom => ArrayType::Custom,
            CliArrayType::Hm450k => ArrayType::Hm450k,
            CliArrayType::Epic => ArrayType::Epic,
            CliArrayType::EpicPlus => ArrayType::EpicPlus,
        }
    }
}

pub(crate) fn init_spinner() -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress_bar.set_message("Processing...");
    progress_bar.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(progress_bar)
}
