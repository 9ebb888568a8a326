//! Command dispatch logic for slapd-stats

use super::{CompileArgs, InitArgs, MonitorArgs, compile_config, init_config, monitor};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "slapd-stats", bin_name = "slapd-stats", version, author, long_about = None)]
#[command(about = "Turn OpenLDAP monitor entries into tagged metrics")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a default configuration file
    Init(InitArgs),
    /// Compile a configuration file and print the statistics it defines
    Compile(CompileArgs),
    /// Poll the directory and record measurements
    Monitor(Box<MonitorArgs>),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        Command::Init(init_args) => init_config(host, init_args),
        Command::Compile(compile_args) => compile_config(host, compile_args),
        Command::Monitor(monitor_args) => monitor(host, monitor_args).await,
    }
}
