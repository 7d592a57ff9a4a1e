//! fmaptool - flashmap inspection and construction
//!
//! A flashmap (FMAP) is a small directory embedded somewhere in a firmware
//! image that names the regions of that image. fmaptool can:
//!
//! - find and print the flashmap of an image (`decode`, `area`)
//! - print a SHA-1 over the static areas of an image (`csum`)
//! - generate a binary flashmap from key/value text (`encode`) or from the
//!   built-in example (`example`)
//!
//! All of the format handling lives in `fmap-core`; this binary only deals
//! with files, arguments and output.

mod cli;
mod commands;
mod error;
mod kv;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Decode { file, offset, name } => {
            commands::inspect::cmd_decode(&file, offset, name.as_deref())
        }
        Commands::Csum { file, list } => commands::inspect::cmd_csum(&file, list),
        Commands::Area { file, name } => commands::inspect::cmd_area(&file, &name),
        Commands::Encode { kv, output } => commands::build::cmd_encode(&kv, &output),
        Commands::Example { output } => commands::build::cmd_example(&output),
    };

    result.map_err(Into::into)
}
