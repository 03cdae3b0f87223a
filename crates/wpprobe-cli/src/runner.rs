//! Subcommand execution

use crate::commands::{CheckConfigArgs, ReportFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_text, ProgressReporter};
use std::path::Path;
use wpprobe::{SuiteConfig, SuiteKind, SuiteReport};

fn reporter(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

/// Load file and environment settings, failing when `suite` lacks any
pub fn load_checked(suite: SuiteKind, path: Option<&Path>) -> CliResult<SuiteConfig> {
    let settings = SuiteConfig::load(path)?;
    let missing = suite.missing_settings(&settings);
    if !missing.is_empty() {
        return Err(CliError::MissingSettings {
            suite: suite.name().to_string(),
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(settings)
}

/// `list`: every suite with its steps, on stdout
pub fn list_suites(_config: &CliConfig) {
    for kind in SuiteKind::ALL {
        println!("{kind}");
        for (index, step) in kind.step_names().iter().enumerate() {
            println!("  {}. {step}", index + 1);
        }
    }
}

/// `check-config`: validate settings without a browser
pub fn check_config(config: &CliConfig, args: &CheckConfigArgs) -> CliResult<()> {
    let settings = load_checked(args.suite, args.config.as_deref())?;
    let reporter = reporter(config);
    reporter.success(&format!("{} settings complete", args.suite));
    if config.verbosity.is_verbose() {
        reporter.info(&format!(
            "browser: headless={} sandbox={} chromium={}",
            settings.browser.headless,
            settings.browser.sandbox,
            settings.browser.chromium_path.as_deref().unwrap_or("auto")
        ));
    }
    Ok(())
}

/// `run`: drive one suite in a fresh browser and report it
pub fn run_suite(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut settings = load_checked(args.suite, args.config.as_deref())?;
    if args.headed {
        settings.browser.headless = false;
    }
    if let Some(path) = &args.chromium {
        settings.browser.chromium_path = Some(path.clone());
    }
    if args.no_sandbox {
        settings.browser.sandbox = false;
    }

    let mut reporter = reporter(config);
    reporter.start_spinner(&format!("running {}", args.suite));
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let outcome = runtime.block_on(execute(args.suite, &settings));
    reporter.finish();
    let report = outcome?;

    emit(&reporter, &report, args)?;
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::SuiteFailed {
            suite: report.suite_name.clone(),
            failed: report.failed_count(),
            skipped: report.skipped_count(),
        })
    }
}

fn emit(reporter: &ProgressReporter, report: &SuiteReport, args: &RunArgs) -> CliResult<()> {
    let rendered = match args.format {
        ReportFormat::Json => Some(report.to_json()?),
        ReportFormat::Text if args.output.is_some() => Some(render_text(report)),
        ReportFormat::Text => None,
    };
    match (rendered, &args.output) {
        (Some(body), Some(path)) => {
            std::fs::write(path, body)?;
            reporter.report(report);
            reporter.info(&format!("report written to {}", path.display()));
        }
        (Some(body), None) => println!("{body}"),
        (None, _) => reporter.report(report),
    }
    Ok(())
}

#[cfg(feature = "browser")]
async fn execute(suite: SuiteKind, settings: &SuiteConfig) -> CliResult<SuiteReport> {
    use wpprobe::{CdpDriver, Session};

    tracing::info!(suite = %suite, headless = settings.browser.headless, "launching browser");
    let driver = CdpDriver::launch(&settings.browser).await?;
    let report = Session::scoped(Box::new(driver), settings.session_config(), |session| async move {
        Ok(suite.run(&session, settings).await)
    })
    .await?;
    Ok(report)
}

#[cfg(not(feature = "browser"))]
async fn execute(suite: SuiteKind, _settings: &SuiteConfig) -> CliResult<SuiteReport> {
    Err(CliError::config(format!(
        "cannot run {suite}: wpprobe-cli was built without the `browser` feature"
    )))
}
