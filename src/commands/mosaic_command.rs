//! The `mosaic` subcommand

use clap::ArgMatches;
use log::info;

use crate::api::SnowMosaic;
use crate::commands::command_traits::Command;
use crate::commands::{parse_target, required_string, Target};
use crate::errors::{Outcome, PipelineResult};

/// Builds the daily mosaic of one day or of every day in a year
pub struct MosaicCommand {
    api: SnowMosaic,
    type_name: String,
    target: Target,
}

impl MosaicCommand {
    pub fn new(args: &ArgMatches, api: SnowMosaic) -> PipelineResult<Self> {
        let type_name = required_string(args, "type")?;
        api.config().source_type(&type_name)?;
        let target = parse_target(args)?;

        Ok(MosaicCommand { api, type_name, target })
    }
}

impl Command for MosaicCommand {
    fn execute(&self) -> PipelineResult<()> {
        match self.target {
            Target::Day(day) => {
                match self.api.mosaic_day(&self.type_name, day)? {
                    Outcome::Written(path) => println!("{}", path.display()),
                    Outcome::NoInput => info!("Nothing to mosaic for {}", day),
                }
                Ok(())
            },
            Target::Year(year) => {
                let report = self.api.mosaic_year(&self.type_name, year)?;
                info!("{} mosaics written, {} days without tiles, {} failed",
                      report.written.len(), report.empty.len(), report.failed.len());
                report.into_result().map(|_| ())
            },
        }
    }
}
