//! Config command

use crate::OutputFormat;
use anyhow::{Context, Result};
use clap::Subcommand;
use geosearch_cli::output::Status;
use geosearch_core::config::{Config, CONFIG_CANDIDATES};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the path of the loaded configuration file
    Path,
}

pub fn render(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&config.schema).context("serializing configuration")
        }
        OutputFormat::Text | OutputFormat::Csv => {
            toml::to_string_pretty(&config.schema).context("serializing configuration")
        }
    }
}

pub fn run(command: ConfigCommand, config: &Config, format: OutputFormat) -> Result<()> {
    match command {
        ConfigCommand::Show => print!("{}", render(config, format)?),
        ConfigCommand::Path => match &config.path {
            Some(path) => println!("{}", path.display()),
            None => Status::info(&format!(
                "No configuration file found, using defaults. Searched: {}",
                CONFIG_CANDIDATES.join(", ")
            )),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosearch_core::config::ConfigSchema;

    #[test]
    fn test_render_round_trips() {
        let config = Config::default();
        let text = render(&config, OutputFormat::Text).unwrap();
        let parsed: ConfigSchema = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config.schema);

        let json = render(&config, OutputFormat::Json).unwrap();
        assert!(json.contains("\"endpoint\""));
    }
}
