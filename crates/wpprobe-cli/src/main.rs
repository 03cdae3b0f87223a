//! wpprobe: serial browser suites for WordPress sites
//!
//! ## Usage
//!
//! ```bash
//! wpprobe list                                  # Suites and their steps
//! wpprobe check-config woocommerce              # Validate settings only
//! wpprobe run flextable --config site.yaml      # Run a suite headless
//! wpprobe run woocommerce --headed -f json      # Watch it, JSON report
//! ```

use clap::Parser;
use std::process::ExitCode;
use wpprobe_cli::{
    check_config, init_logging, list_suites, run_suite, Cli, CliConfig, CliResult, ColorChoice, Commands,
    Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Run(args) => run_suite(&config, &args),
        Commands::List => {
            list_suites(&config);
            Ok(())
        }
        Commands::CheckConfig(args) => check_config(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}
