//! Command pattern interfaces
//!
//! Each subcommand is parsed into a `Command` object by a `CommandFactory`
//! and then executed.

use crate::errors::PipelineResult;

/// An executable command of the application
pub trait Command {
    /// Run the command; a failed batch is reported as an error
    fn execute(&self) -> PipelineResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    fn create_command(&self, args: &clap::ArgMatches) -> PipelineResult<Box<dyn Command>>;
}
