mod palette;
mod trace;
mod utils;

use crate::cli::{Cli, Commands};
use icontrace::TraceResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> TraceResult<()> {
    match cli.command {
        Commands::Trace(cmd) => trace::run(cmd),
        Commands::Palette(cmd) => palette::run(cmd),
    }
}
