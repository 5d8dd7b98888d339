//! CLI command implementations

pub mod command_traits;
pub mod mosaic_command;
pub mod composite_command;

pub use command_traits::{Command, CommandFactory};
pub use mosaic_command::MosaicCommand;
pub use composite_command::CompositeCommand;

use std::path::{Path, PathBuf};

use clap::ArgMatches;

use crate::api::SnowMosaic;
use crate::config::PipelineConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::mosaic::DayId;

/// What a subcommand processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Day(DayId),
    Year(i32),
}

fn required_string(args: &ArgMatches, name: &str) -> PipelineResult<String> {
    args.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| PipelineError::Config(format!("missing --{}", name)))
}

/// `--day YYYYDDD` or `--year YYYY`
fn parse_target(args: &ArgMatches) -> PipelineResult<Target> {
    if let Some(day) = args.get_one::<String>("day") {
        return DayId::parse(day)
            .map(Target::Day)
            .ok_or_else(|| PipelineError::Config(format!("--day must be YYYYDDD, got '{}'", day)));
    }

    match args.get_one::<String>("year") {
        Some(year) => year.parse::<i32>()
            .map(Target::Year)
            .map_err(|_| PipelineError::Config(format!("--year must be a number, got '{}'", year))),
        None => Err(PipelineError::Config("either --day or --year is required".to_string())),
    }
}

/// The built-in configuration or the file given with `--config`
fn load_config(args: &ArgMatches) -> PipelineResult<PipelineConfig> {
    match args.get_one::<String>("config") {
        Some(path) => PipelineConfig::from_file(Path::new(path)),
        None => PipelineConfig::builtin(),
    }
}

/// Factory for creating command instances based on CLI arguments
pub struct SnowmosaicCommandFactory;

impl SnowmosaicCommandFactory {
    pub fn new() -> Self {
        SnowmosaicCommandFactory
    }
}

impl Default for SnowmosaicCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for SnowmosaicCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> PipelineResult<Box<dyn Command>> {
        let (name, sub_args) = args.subcommand()
            .ok_or_else(|| PipelineError::Config("no subcommand given".to_string()))?;

        let mut config = load_config(args)?;
        if let Some(days) = sub_args.try_get_one::<String>("days").ok().flatten() {
            config.composite_days = match days.parse::<usize>() {
                Ok(days) if days >= 2 => days,
                _ => return Err(PipelineError::Config(format!("--days must be an integer of at least 2, got '{}'", days))),
            };
        }

        let root = PathBuf::from(required_string(sub_args, "root")?);
        let api = SnowMosaic::new(config, &root)?;

        match name {
            "mosaic" => Ok(Box::new(MosaicCommand::new(sub_args, api)?)),
            "composite" => Ok(Box::new(CompositeCommand::new(sub_args, api)?)),
            other => Err(PipelineError::Config(format!("unknown subcommand '{}'", other))),
        }
    }
}
