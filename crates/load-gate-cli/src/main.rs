// crates/load-gate-cli/src/main.rs
// ============================================================================
// Module: Load Gate CLI Entry Point
// Description: Command dispatcher for the load-time gate and the smoke check.
// Purpose: Run the pipeline, print progress, and map outcomes to exit codes.
// Dependencies: clap, load-gate-config, load-gate-core, thiserror.
// ============================================================================

//! ## Overview
//! `load-gate` (or `load-gate run`) reads its configuration from the
//! environment, submits the payload, probes and audits the returned page, and
//! exits 0 when the submit time is under the threshold. `load-gate smoke`
//! checks that a page renders an element with a given class.
//!
//! Every fatal run failure is mapped to a diagnostic in exactly one place,
//! [`gate_diagnostic`], and exits with status 1. All text comes from the
//! message catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use load_gate_cli::t;
use load_gate_config::LoadGateConfig;
use load_gate_config::OptionalEnv;
use load_gate_config::read_env_strict;
use load_gate_core::AuditOutcome;
use load_gate_core::BrowserOptions;
use load_gate_core::ChromeProber;
use load_gate_core::CompositeObserver;
use load_gate_core::GateError;
use load_gate_core::JsonLinesObserver;
use load_gate_core::LighthouseRunner;
use load_gate_core::Pipeline;
use load_gate_core::PipelineOptions;
use load_gate_core::RunEvent;
use load_gate_core::RunObserver;
use load_gate_core::SmokeCheck;
use load_gate_core::Verdict;
use load_gate_core::browser_options_for;
use load_gate_core::run_smoke_check;
use load_gate_core::smoke::DEFAULT_SMOKE_CLASS;
use load_gate_core::smoke::DEFAULT_SMOKE_WAIT;
use load_gate_core::submitter_for;
use load_gate_core::validate_target_url;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable the smoke check falls back to for its URL.
const WEB_PATH_ENV: &str = "WEB_PATH";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "load-gate",
    disable_help_subcommand = true,
    disable_version_flag = true,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Run flags used when no subcommand is given.
    #[command(flatten)]
    run: RunCommand,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit the payload, probe and audit the page, and judge the load time.
    Run(RunCommand),
    /// Check that a page renders an element with the given class.
    Smoke(SmokeCommand),
}

/// Arguments for the load-time run.
#[derive(Args, Debug)]
struct RunCommand {
    /// Print the payload, indented with sorted keys, before submitting.
    #[arg(long, action = ArgAction::SetTrue)]
    print_payload: bool,
    /// Do not launch the browser for navigation timing.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_browser: bool,
    /// Do not run the audit tool.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_audit: bool,
    /// Write a JSON run report to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Write one JSON record per run event to this path.
    #[arg(long, value_name = "PATH")]
    event_log: Option<PathBuf>,
}

/// Arguments for the smoke check.
#[derive(Args, Debug)]
struct SmokeCommand {
    /// Page to check (defaults to `WEB_PATH`).
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// Class name the page must contain.
    #[arg(long = "class", value_name = "NAME", default_value = DEFAULT_SMOKE_CLASS)]
    class_name: String,
    /// Seconds to wait for the element.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SMOKE_WAIT.as_secs())]
    wait_sec: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for output-channel failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        stdout_line(&t!("main.version", version = version))?;
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command {
        None => command_run(&cli.run),
        Some(Commands::Run(command)) => command_run(&command),
        Some(Commands::Smoke(command)) => command_smoke(&command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the load-time run.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = match LoadGateConfig::load() {
        Ok(config) => config,
        Err(err) => return report_gate_error(&GateError::Config(err)),
    };
    let submitter = match submitter_for(&config) {
        Ok(submitter) => submitter,
        Err(err) => return report_gate_error(&err),
    };
    let prober = ChromeProber::new(browser_options_for(&config));
    let mut pipeline =
        Pipeline::new(config, submitter, prober, LighthouseRunner).with_options(PipelineOptions {
            print_payload: command.print_payload,
            skip_browser: command.skip_browser,
            skip_audit: command.skip_audit,
            ..PipelineOptions::default()
        });

    let mut console = ConsoleObserver::default();
    let mut event_log = match command.event_log.as_deref() {
        Some(path) => Some(open_event_log(path)?),
        None => None,
    };
    let outcome = {
        let mut observers = CompositeObserver::new().with(&mut console);
        if let Some(log) = event_log.as_mut() {
            observers = observers.with(log);
        }
        pipeline.run(&mut observers)
    };
    console.finish()?;
    if let (Some(log), Some(path)) = (event_log.as_ref(), command.event_log.as_deref())
        && let Some(error) = log.error()
    {
        stderr_line(&t!("run.event_log.write_failed", path = path.display(), error = error))?;
    }

    match outcome {
        Ok(report) => {
            if let Some(path) = command.report.as_deref() {
                report.write_to(path).map_err(|err| {
                    CliError::new(t!(
                        "run.report.write_failed",
                        path = path.display(),
                        error = err
                    ))
                })?;
                stdout_line(&t!("run.report.written", path = path.display()))?;
            }
            Ok(ExitCode::from(report.verdict.exit_code()))
        }
        Err(err) => report_gate_error(&err),
    }
}

/// Opens the JSON-lines event log, truncating any previous content.
fn open_event_log(path: &Path) -> CliResult<JsonLinesObserver<BufWriter<File>>> {
    let file = File::create(path).map_err(|err| {
        CliError::new(t!("run.event_log.open_failed", path = path.display(), error = err))
    })?;
    Ok(JsonLinesObserver::new(BufWriter::new(file)))
}

/// Prints the diagnostic for a fatal run failure and returns its exit code.
fn report_gate_error(err: &GateError) -> CliResult<ExitCode> {
    let cwd = env::current_dir().ok();
    for line in gate_diagnostic(err, cwd.as_deref()) {
        stdout_line(&line)?;
    }
    Ok(ExitCode::from(err.exit_code()))
}

/// Maps each fatal failure kind to its diagnostic lines.
fn gate_diagnostic(err: &GateError, cwd: Option<&Path>) -> Vec<String> {
    match err {
        GateError::Config(error) => {
            vec![t!("error.config", error = error), t!("error.config.required")]
        }
        GateError::PayloadUnreadable {
            root,
            source,
        } => {
            let cwd = cwd.map_or_else(|| t!("error.cwd_unknown"), |cwd| cwd.display().to_string());
            vec![
                t!("error.payload", error = source),
                t!("error.payload.attempted", path = source.path().display()),
                t!("error.payload.cwd", cwd = cwd),
                t!("error.payload.root", root = root.display()),
            ]
        }
        GateError::Submit(error) => vec![t!("error.submit", error = error)],
        GateError::ResponseMalformed(error) => vec![t!("error.response", error = error)],
        GateError::Probe(error) => vec![t!("error.probe", error = error)],
    }
}

// ============================================================================
// SECTION: Smoke Command
// ============================================================================

/// Executes the smoke check.
fn command_smoke(command: &SmokeCommand) -> CliResult<ExitCode> {
    let raw_url = match command.url.clone() {
        Some(url) => url,
        None => match read_env_strict(WEB_PATH_ENV) {
            Ok(Some(url)) if !url.trim().is_empty() => url,
            Ok(_) => {
                stdout_line(&t!("smoke.url_missing", env = WEB_PATH_ENV))?;
                return Ok(ExitCode::FAILURE);
            }
            Err(err) => {
                stdout_line(&t!("error.config", error = err))?;
                return Ok(ExitCode::FAILURE);
            }
        },
    };
    let url = match validate_target_url(raw_url.trim()) {
        Ok(url) => url,
        Err(err) => {
            stdout_line(&t!("smoke.url_invalid", error = err))?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let chrome_path = match read_env_strict(OptionalEnv::ChromePath.as_str()) {
        Ok(path) => path.filter(|path| !path.trim().is_empty()).map(PathBuf::from),
        Err(err) => {
            stdout_line(&t!("error.config", error = err))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    stdout_line(&t!("smoke.started", url = url, class = command.class_name))?;
    let check = SmokeCheck {
        url,
        class_name: command.class_name.clone(),
        wait: Duration::from_secs(command.wait_sec),
    };
    let options = BrowserOptions {
        chrome_path,
        disable_gpu: true,
        ..BrowserOptions::default()
    };
    match run_smoke_check(&options, &check) {
        Ok(()) => {
            stdout_line(&t!("smoke.passed"))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            stdout_line(&t!("smoke.failed", error = err))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ============================================================================
// SECTION: Console Observer
// ============================================================================

/// Prints run events as catalog text on stdout.
#[derive(Default)]
struct ConsoleObserver {
    /// First write failure, if any.
    error: Option<std::io::Error>,
}

impl ConsoleObserver {
    /// Surfaces the first write failure.
    fn finish(self) -> CliResult<()> {
        self.error.map_or(Ok(()), |err| Err(CliError::new(output_error("stdout", &err))))
    }
}

impl RunObserver for ConsoleObserver {
    fn on_event(&mut self, event: &RunEvent) {
        if self.error.is_some() {
            return;
        }
        for line in render_event(event) {
            if let Err(err) = write_stdout_line(&line) {
                self.error = Some(err);
                return;
            }
        }
    }
}

/// Renders one run event as console lines.
fn render_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::Started {
            post_address,
            threshold_secs,
        } => vec![t!("run.started", address = post_address, threshold = threshold_secs)],
        RunEvent::PayloadLoaded {
            path,
            rendered,
        } => {
            let mut lines = vec![t!("run.payload.loaded", path = path)];
            if let Some(payload) = rendered {
                lines.push(t!("run.payload.rendered", payload = payload));
            }
            lines
        }
        RunEvent::Submitted {
            elapsed_secs,
            status,
            url,
            headers,
            body,
        } => {
            let mut lines =
                vec![t!("run.submit.url", url = url), t!("run.submit.status", status = status)];
            lines.extend(
                headers.iter().map(|(name, value)| t!("run.submit.header", name = name, value = value)),
            );
            lines.push(t!("run.submit.body", body = body));
            lines.push(t!("run.submit.elapsed", seconds = format_seconds(*elapsed_secs)));
            lines
        }
        RunEvent::TargetResolved {
            url,
        } => vec![t!("run.target", url = url)],
        RunEvent::Probed {
            backend_ms,
            frontend_ms,
        } => vec![
            t!("run.probe.backend", ms = format!("{backend_ms:.1}")),
            t!("run.probe.frontend", ms = format!("{frontend_ms:.1}")),
        ],
        RunEvent::ProbeSkipped => vec![t!("run.probe.skipped")],
        RunEvent::AuditStarted {
            command,
        } => vec![t!("run.audit.started", command = command)],
        RunEvent::AuditFinished {
            outcome,
        } => vec![match outcome {
            AuditOutcome::Succeeded => t!("run.audit.succeeded"),
            AuditOutcome::Failed {
                code: Some(code),
            } => t!("run.audit.failed", code = code),
            AuditOutcome::Failed {
                code: None,
            } => t!("run.audit.killed"),
            AuditOutcome::Unavailable {
                reason,
            } => t!("run.audit.unavailable", reason = reason),
            AuditOutcome::Skipped => t!("run.audit.skipped"),
        }],
        RunEvent::Decided {
            verdict,
            elapsed_secs,
            threshold_secs,
        } => {
            let seconds = format_seconds(*elapsed_secs);
            vec![match verdict {
                Verdict::Pass => t!("run.verdict.pass", seconds = seconds, threshold = threshold_secs),
                Verdict::Fail => t!("run.verdict.fail", seconds = seconds, threshold = threshold_secs),
            }]
        }
    }
}

/// Formats a duration in seconds with millisecond precision.
fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}")
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout, mapping failures to [`CliError`].
fn stdout_line(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr, mapping failures to [`CliError`].
fn stderr_line(message: &str) -> CliResult<()> {
    write_stderr_line(message).map_err(|err| CliError::new(output_error("stderr", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
