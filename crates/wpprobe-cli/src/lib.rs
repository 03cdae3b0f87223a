//! wpprobe CLI library
//!
//! Command-line runner for the wpprobe suites: argument parsing, settings
//! checks, log subscriber setup and report rendering.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{CheckConfigArgs, Cli, ColorArg, Commands, ReportFormat, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::{render_text, ProgressReporter};
pub use runner::{check_config, list_suites, load_checked, run_suite};
