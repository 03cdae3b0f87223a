//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wpprobe::SuiteKind;

/// wpprobe: serial browser suites for WordPress FlexTable and WooCommerce
#[derive(Parser, Debug)]
#[command(name = "wpprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a suite against a live site
    Run(RunArgs),

    /// List suites and their steps
    List,

    /// Check that every setting a suite needs is present
    CheckConfig(CheckConfigArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Suite to run (flextable, woocommerce)
    #[arg(value_parser = parse_suite)]
    pub suite: SuiteKind,

    /// YAML configuration file; environment variables override it
    #[arg(short, long, env = "WPPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the chromium binary
    #[arg(long)]
    pub chromium: Option<String>,

    /// Disable the chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the check-config command
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Suite to check (flextable, woocommerce)
    #[arg(value_parser = parse_suite)]
    pub suite: SuiteKind,

    /// YAML configuration file; environment variables override it
    #[arg(short, long, env = "WPPROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

fn parse_suite(value: &str) -> Result<SuiteKind, String> {
    value.parse().map_err(|e: wpprobe::ProbeError| e.to_string())
}

/// Report format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_command() {
            let cli = Cli::parse_from(["wpprobe", "run", "woocommerce"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run command");
            };
            assert_eq!(args.suite, SuiteKind::WooCommerce);
            assert_eq!(args.format, ReportFormat::Text);
            assert!(!args.headed);
            assert!(args.output.is_none());
        }

        #[test]
        fn test_parse_run_with_options() {
            let cli = Cli::parse_from([
                "wpprobe",
                "-vv",
                "run",
                "flextable",
                "--config",
                "site.yaml",
                "--headed",
                "--chromium",
                "/usr/bin/chromium",
                "--format",
                "json",
                "--output",
                "report.json",
            ]);
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run command");
            };
            assert_eq!(args.suite, SuiteKind::FlexTable);
            assert_eq!(args.config, Some(PathBuf::from("site.yaml")));
            assert!(args.headed);
            assert_eq!(args.chromium.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(args.format, ReportFormat::Json);
            assert_eq!(args.output, Some(PathBuf::from("report.json")));
        }

        #[test]
        fn test_unknown_suite_is_rejected() {
            assert!(Cli::try_parse_from(["wpprobe", "run", "shop"]).is_err());
        }

        #[test]
        fn test_parse_list_and_check_config() {
            let cli = Cli::parse_from(["wpprobe", "list"]);
            assert!(matches!(cli.command, Commands::List));
            let cli = Cli::parse_from(["wpprobe", "--quiet", "check-config", "flextable"]);
            assert!(cli.quiet);
            assert!(matches!(cli.command, Commands::CheckConfig(_)));
        }
    }
}
