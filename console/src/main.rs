mod pipeline;
mod process;
mod utils;

use clap::{
    Parser,
    Subcommand,
};
use pipeline::PipelineArgs;
use process::ProcessArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    #[command(about = "Run the preset, flag-driven correction pipeline.")]
    Process {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ProcessArgs,
    },

    #[command(about = "Run an explicitly listed sequence of correction steps.")]
    Pipeline {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  PipelineArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Process { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Pipeline { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
    }
    Ok(())
}
