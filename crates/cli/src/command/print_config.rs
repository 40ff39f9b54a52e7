use crate::app::Args;
use anyhow::Result;
use clap::Parser;

/// Prints the effective configuration, defaults included.
#[derive(Parser, Debug, Clone)]
pub struct PrintConfig;

impl PrintConfig {
    pub fn run(&self, args: Args) -> Result<()> {
        let (config, config_err) = livepad_config::load_config_on_startup(args.config_file);

        if let Some(err) = config_err {
            eprintln!("Invalid config file, using the defaults: {err}");
        }

        if let Some(config_file) = livepad_config::config_file() {
            println!("# {}", config_file.display());
        }

        print!("{}", toml::to_string_pretty(config)?);

        Ok(())
    }
}
