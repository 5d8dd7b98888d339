use clap::{Arg, ArgAction, ArgGroup, Command as ClapCommand};
use log::{error, LevelFilter};
use std::path::Path;
use std::process;

use snowmosaic::commands::{CommandFactory, SnowmosaicCommandFactory};
use snowmosaic::utils::logger::Logger;

fn product_args(command: ClapCommand) -> ClapCommand {
    command
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .help("Root folder of the product tree (<root>/<year>/<type folder>/<YYYYDDD>)")
                .value_name("DIR")
                .required(true),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .help("Source type from the configuration, e.g. forcing or fraction")
                .value_name("NAME")
                .required(true),
        )
        .arg(
            Arg::new("year")
                .short('y')
                .long("year")
                .help("Process every day of this year")
                .value_name("YYYY"),
        )
        .arg(
            Arg::new("day")
                .short('d')
                .long("day")
                .help("Process a single day")
                .value_name("YYYYDDD"),
        )
        .group(
            ArgGroup::new("target")
                .args(["year", "day"])
                .required(true),
        )
}

fn main() {
    let matches = ClapCommand::new("snowmosaic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Daily GeoTIFF tile mosaics and multi-day composites")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file replacing the built-in defaults")
                .value_name("FILE")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also append log records to this file")
                .value_name("FILE")
                .global(true),
        )
        .subcommand(product_args(
            ClapCommand::new("mosaic")
                .about("Mosaic the tiles of a day into one raster"),
        ))
        .subcommand(product_args(
            ClapCommand::new("composite")
                .about("Average daily mosaics over multi-day windows")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .help("Window length in days, overriding the configuration")
                        .value_name("N"),
                ),
        ))
        .get_matches();

    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };

    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            if let Err(e) = Logger::init_global_logger(Path::new(log_file), level) {
                eprintln!("Error setting up logger: {}", e);
                process::exit(1);
            }
        },
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
                .init();
        },
    }

    let factory = SnowmosaicCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
