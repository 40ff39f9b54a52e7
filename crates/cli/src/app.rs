use crate::command;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub enum RunCmd {
    /// Start the playground server.
    #[clap(name = "serve")]
    Serve(command::serve::Serve),
    /// Print the effective configuration as TOML.
    #[clap(name = "print-config")]
    PrintConfig(command::print_config::PrintConfig),
}

/// livepad CLI arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Enable the logging system.
    #[clap(long)]
    pub log: Option<std::path::PathBuf>,

    /// Specify the path of the config file.
    #[clap(long)]
    pub config_file: Option<std::path::PathBuf>,
}

impl RunCmd {
    pub async fn run(self, args: Args) -> Result<()> {
        match self {
            Self::Serve(serve) => serve.run(args).await,
            Self::PrintConfig(print_config) => print_config.run(args),
        }
    }
}
