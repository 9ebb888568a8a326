//! Command-line interface for slapd-stats
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **init**: Write the default configuration, an OpenLDAP `cn=Monitor` layout
//! - **compile**: Compile a configuration and print the resulting statistic
//!   definitions (or the whole compiled tree), which is the quickest way to
//!   check what a configuration will poll
//! - **monitor**: Compile a configuration, start one poller per database, and
//!   record measurements until Ctrl-C or a cycle limit
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. Configuration is a YAML file holding a
//! few settings plus the declarative monitoring tree; it is compiled fully
//! before any poller starts, so a bad tree stops the process immediately.

mod common;
mod compile;
mod config;
mod host;
mod init;
mod monitor;
mod run;

pub use common::LogLevel;
pub use compile::{CompileArgs, OutputFormat, compile_config};
pub use config::{Config, DEFAULT_CONFIG_YAML};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use monitor::{MonitorArgs, monitor};
pub use run::run;
