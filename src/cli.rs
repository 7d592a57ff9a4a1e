//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal offset
fn parse_offset(s: &str) -> Result<usize, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<usize>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "fmaptool")]
#[command(author, version, about = "Flashmap (FMAP) inspection and construction", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the flashmap in an image and print it as key/value lines
    Decode {
        /// Firmware image
        file: PathBuf,

        /// Decode at this offset instead of searching (hex or decimal)
        #[arg(long, value_parser = parse_offset)]
        offset: Option<usize>,

        /// Only accept a flashmap with this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the SHA-1 of all static areas of an image
    Csum {
        /// Firmware image
        file: PathBuf,

        /// Also list the areas that were hashed
        #[arg(short, long)]
        list: bool,
    },

    /// Print a single area of the flashmap in an image
    Area {
        /// Firmware image
        file: PathBuf,

        /// Area name (exact match)
        name: String,
    },

    /// Generate a binary flashmap from key/value text
    Encode {
        /// Key/value input file
        #[arg(short, long)]
        kv: PathBuf,

        /// Output file for the binary flashmap
        output: PathBuf,
    },

    /// Write an example four-area flashmap
    Example {
        /// Output file for the binary flashmap
        output: PathBuf,
    },
}
