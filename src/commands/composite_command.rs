//! The `composite` subcommand

use clap::ArgMatches;
use log::info;

use crate::api::SnowMosaic;
use crate::commands::command_traits::Command;
use crate::commands::{parse_target, required_string, Target};
use crate::errors::{Outcome, PipelineResult};

/// Averages daily mosaics over one window or over every window of a year
pub struct CompositeCommand {
    api: SnowMosaic,
    type_name: String,
    target: Target,
}

impl CompositeCommand {
    pub fn new(args: &ArgMatches, api: SnowMosaic) -> PipelineResult<Self> {
        let type_name = required_string(args, "type")?;
        api.config().source_type(&type_name)?;
        let target = parse_target(args)?;

        Ok(CompositeCommand { api, type_name, target })
    }
}

impl Command for CompositeCommand {
    fn execute(&self) -> PipelineResult<()> {
        match self.target {
            Target::Day(start) => {
                match self.api.composite(&self.type_name, start)? {
                    Outcome::Written(path) => println!("{}", path.display()),
                    Outcome::NoInput => info!("No daily mosaics in the window starting {}", start),
                }
                Ok(())
            },
            Target::Year(year) => {
                let report = self.api.composite_year(&self.type_name, year)?;
                info!("{} composites written, {} windows without mosaics, {} failed",
                      report.written.len(), report.empty.len(), report.failed.len());
                report.into_result().map(|_| ())
            },
        }
    }
}
