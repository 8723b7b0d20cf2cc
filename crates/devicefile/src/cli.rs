use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;

/// Generate and query device files describing groups of AVR devices
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[clap(disable_help_subcommand = true)]
pub struct Cli {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the device file for a group of devices
    Generate {
        /// JSON file with one record per device of the group
        #[arg(short, long)]
        input: Utf8PathBuf,
        /// JSON pin/peripheral reference table
        #[arg(short, long)]
        pins: Option<Utf8PathBuf>,
        /// Directory to write the device file to
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
        /// Emit a separate USI driver (USI normally only emulates UART, SPI and I2C)
        #[arg(long)]
        usi: bool,
    },
    /// Find the device file for a device string
    Find {
        /// Directory with one sub directory of device files per platform
        #[arg(short, long)]
        devices: Utf8PathBuf,
        /// Device string, e.g. atmega328p
        device: String,
    },
    /// Print the properties of one concrete device as JSON
    Properties {
        /// Directory with one sub directory of device files per platform
        #[arg(short, long)]
        devices: Utf8PathBuf,
        /// Device string, e.g. atmega328p
        device: String,
    },
}
