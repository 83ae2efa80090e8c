pub mod app;
pub mod capture;
pub mod config;
pub mod controller;
pub mod errors;
pub mod fsm;
pub mod hotkeys;
pub mod logging;
pub mod runtime;
pub mod script;
pub mod session;
pub mod tui;
pub mod types;

pub use controller::{ControllerHandles, ControllerSettings, Dispatch, RecordingController};
pub use errors::RecorderError;
pub use session::RecorderSession;
pub use types::Mode;

use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{load_config, CliOverrides};
use runtime::ProductionRuntime;

#[derive(Debug, Clone, Parser)]
#[command(name = "input-recorder")]
#[command(about = "Record edits to a text field and play them back")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    /// Milliseconds between playback ticks.
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Append controller events as JSON lines to this file.
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
    #[arg(long, default_value_t = false)]
    pub no_structural_capture: bool,
    /// Run a headless script instead of the interactive front end.
    #[arg(long)]
    pub script: Option<std::path::PathBuf>,
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

pub fn run() -> Result<i32, RecorderError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    runtime: &ProductionRuntime,
) -> Result<i32, RecorderError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(RecorderError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        interval_ms: cli.interval_ms,
        log_file: cli.log_file.clone(),
        no_structural_capture: cli.no_structural_capture,
    };
    let cfg = load_config(&overrides, runtime.file_system.as_ref())?;

    if cli.print_config {
        let rendered =
            toml::to_string_pretty(&cfg).map_err(|e| RecorderError::ConfigParse(e.to_string()))?;
        runtime.terminal.write_line(rendered.trim_end())?;
        return Ok(0);
    }

    if let Some(path) = &cli.script {
        let source = runtime.file_system.read_to_string(path)?;
        let steps = script::parse_script(&source)?;
        for line in script::run_script(&cfg, &steps) {
            runtime.terminal.write_line(&line)?;
        }
        return Ok(0);
    }

    if !runtime.terminal.stdin_is_tty() {
        return Err(RecorderError::Cli(
            "interactive mode requires a terminal; pass --script for headless runs".to_string(),
        ));
    }

    app::run_interactive(&cfg)?;
    Ok(0)
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    cmd.render_long_help().to_string()
}
