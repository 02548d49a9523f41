use crate::environment::ConsoleConfig;
use crate::errors::display_user_error;
use crate::repl::Repl;
use anyhow::{Context as _, Result};
use clap::Parser;
use lcon_types::Severity;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

pub mod completion;
pub mod console;
pub mod environment;
pub mod errors;
pub mod eval;
pub mod history;
pub mod inspect;
pub mod repl;
pub mod runtime;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Evaluate one command, print its output and exit
    #[arg(short, long)]
    pub command: Option<String>,

    /// Print output of --command as JSON lines
    #[arg(long, requires = "command")]
    pub json: bool,

    /// Skip the init script
    #[arg(long)]
    pub no_init: bool,

    /// Config file to use instead of the XDG one
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn lib_main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize tracing: {err:#}");
        return ExitCode::FAILURE;
    }

    setup_panic_handler();

    match run_console(cli) {
        Ok(code) => code,
        Err(err) => {
            display_user_error(&err);
            ExitCode::FAILURE
        }
    }
}

pub fn run_console(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::load()?,
    };
    let mut repl = Repl::new(&config)?;

    if cli.no_init {
        debug!("init script skipped");
    } else if let Err(err) = repl.run_init_script(&config) {
        warn!("init script failed: {err:#}");
        repl.console.print_line(format!("{err:#}"), Severity::Warning);
    }

    let mut out = std::io::stdout().lock();

    if let Some(command) = &cli.command {
        repl.execute_line(command);
        let ok = if cli.json {
            repl.print_json(&mut out)?
        } else {
            repl.print_plain(&mut out)?
        };
        return Ok(exit_code(ok));
    }

    if !std::io::stdin().is_terminal() {
        let ok = repl.run_piped(std::io::stdin().lock(), &mut out)?;
        return Ok(exit_code(ok));
    }

    drop(out);
    repl.run_interactive()?;
    Ok(ExitCode::SUCCESS)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub fn init_tracing() -> Result<()> {
    let log_path = environment::get_state_file(environment::LOG_FILE)?;
    let log_file = std::sync::Arc::new(
        std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?,
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to set subscriber: {err}"))?;
    Ok(())
}

pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        // Restore the terminal before anything is printed
        let _ = crossterm::terminal::disable_raw_mode();

        let payload = panic_info.payload().downcast_ref::<&str>().map_or_else(
            || {
                if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic payload".to_string()
                }
            },
            |s| (*s).to_string(),
        );

        let location = panic_info.location().map_or_else(
            || "Unknown location".to_string(),
            |location| format!("{}:{}:{}", location.file(), location.line(), location.column()),
        );

        tracing::error!("PANIC OCCURRED: {payload} at {location}");
        eprintln!("\nlcon panicked: {payload}");
        eprintln!("Location: {location}");
        eprintln!("See {} for details", environment::LOG_FILE);
    }));
}
