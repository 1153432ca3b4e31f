mod commands;
mod export;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, discover};
use netsweep_common::error;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);
    print::header("netsweep", commands.quiet);

    let cfg = commands.to_config();
    match discover::discover(&cfg, commands.save.as_deref(), commands.quiet).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
