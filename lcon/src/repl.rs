//! Terminal host for the console.
//!
//! Renders the log and the input line with crossterm and forwards key
//! presses to [`Console`]. Lines starting with `:` are host commands that
//! inspect the runtime instead of evaluating Lua.

use crate::console::Console;
use crate::environment::ConsoleConfig;
use crate::inspect::{self, InspectFilter};
use crate::runtime::LuaRuntime;
use anyhow::{Context as _, Result};
use crossterm::cursor;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::queue;
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode};
use lcon_types::{LogLine, Severity, SharedLog};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub mod key_action;
use key_action::{KeyAction, determine_key_action};

const PROMPT: &str = "lua> ";
const CANDIDATE_SEPARATOR: &str = " | ";

const HELP: &str = "\
:globals [path] [filter]   list bindings of a scope (functions hidden with -f)
:set <path> <name> <value> edit a string or number binding (path _G for globals)
:info                      memory used by the runtime
:gc                        run a full garbage collection
:history                   list recalled commands
:help                      this text";

/// Host-side commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Globals {
        path: Vec<String>,
        filter: Option<String>,
        hide_functions: bool,
    },
    Set {
        path: Vec<String>,
        name: String,
        value: String,
    },
    Info,
    Gc,
    History,
    Help,
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl MetaCommand {
    /// `None` when `line` is not a host command.
    pub fn parse(line: &str) -> Option<Result<MetaCommand>> {
        let rest = line.trim().strip_prefix(':')?;
        let mut words = rest.split_whitespace();
        let command = words.next().unwrap_or_default();
        let parsed = match command {
            "globals" | "g" => {
                let mut args: Vec<&str> = words.collect();
                let hide_functions = args.iter().any(|a| *a == "-f");
                args.retain(|a| *a != "-f");
                Ok(MetaCommand::Globals {
                    path: args.first().map(|p| split_path(p)).unwrap_or_default(),
                    filter: args.get(1).map(|f| f.to_string()),
                    hide_functions,
                })
            }
            "set" => {
                let path = words.next();
                let name = words.next();
                let value = words.collect::<Vec<_>>().join(" ");
                match (path, name) {
                    (Some(path), Some(name)) => Ok(MetaCommand::Set {
                        path: split_path(path),
                        name: name.to_string(),
                        value,
                    }),
                    _ => Err(anyhow::anyhow!("usage: :set <path> <name> <value>")),
                }
            }
            "info" => Ok(MetaCommand::Info),
            "gc" => Ok(MetaCommand::Gc),
            "history" => Ok(MetaCommand::History),
            "help" | "?" => Ok(MetaCommand::Help),
            other => Err(anyhow::anyhow!("unknown command: :{other} (try :help)")),
        };
        Some(parsed)
    }
}

pub struct Repl {
    pub console: Console<LuaRuntime>,
}

impl Repl {
    /// Create a console with a fresh Lua state attached.
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let log = SharedLog::with_capacity(config.max_log_lines);
        let mut console = Console::with_log(config, log.clone());
        console.attach(LuaRuntime::new(log).context("failed to create lua runtime")?);
        Ok(Repl { console })
    }

    /// Run the configured init script, if there is one.
    pub fn run_init_script(&mut self, config: &ConsoleConfig) -> Result<()> {
        let Some(path) = config.init_script_path()? else {
            debug!("no init script");
            return Ok(());
        };
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read init script: {}", path.display()))?;
        debug!("running init script {}", path.display());
        self.console.run_command(&source);
        Ok(())
    }

    /// Evaluate or dispatch one submitted line.
    pub fn execute_line(&mut self, line: &str) {
        match MetaCommand::parse(line) {
            Some(Ok(command)) => self.run_meta(command),
            Some(Err(err)) => self.console.print_line(err.to_string(), Severity::Warning),
            None => self.console.on_submit(line),
        }
    }

    fn run_meta(&mut self, command: MetaCommand) {
        let Some(runtime) = self.console.runtime() else {
            self.console
                .print_line("no runtime bound, commands have no effect", Severity::Error);
            return;
        };

        let mut lines: Vec<LogLine> = Vec::new();
        match command {
            MetaCommand::Globals {
                path,
                filter,
                hide_functions,
            } => {
                let filter = InspectFilter {
                    search: filter,
                    hide_functions,
                };
                match inspect::inspect(runtime, &path, &filter) {
                    Ok(mut rows) => {
                        rows.sort_by(|a, b| a.name.cmp(&b.name));
                        for row in rows {
                            lines.push(LogLine::new(
                                format!("{:<24} {:<10} {}", row.name, row.kind, row.preview),
                                Severity::Note,
                            ));
                        }
                    }
                    Err(err) => lines.push(LogLine::new(err.to_string(), Severity::Error)),
                }
            }
            MetaCommand::Set { path, name, value } => {
                match inspect::edit_leaf(runtime, &path, &name, &value) {
                    Ok(true) => lines.push(LogLine::new(format!("{name} updated"), Severity::Success)),
                    Ok(false) => lines.push(LogLine::new(format!("{name} unchanged"), Severity::Note)),
                    Err(err) => lines.push(LogLine::new(err.to_string(), Severity::Error)),
                }
            }
            MetaCommand::Info => lines.push(LogLine::new(
                format!(
                    "Lua memory usage: {}",
                    inspect::format_memory(runtime.memory_usage())
                ),
                Severity::Note,
            )),
            MetaCommand::Gc => match runtime.collect_garbage() {
                Ok(()) => lines.push(LogLine::new(
                    format!(
                        "collected, now {}",
                        inspect::format_memory(runtime.memory_usage())
                    ),
                    Severity::Success,
                )),
                Err(err) => lines.push(LogLine::new(format!("{err:#}"), Severity::Error)),
            },
            MetaCommand::History => {
                for (i, entry) in self.console.history().iter().enumerate() {
                    lines.push(LogLine::new(format!("{:>3}  {entry}", i + 1), Severity::Note));
                }
            }
            MetaCommand::Help => lines.push(LogLine::new(HELP, Severity::Note)),
        }

        for line in lines {
            self.console.print_line(line.text, line.severity);
        }
    }

    /// Interactive line editor on a raw-mode terminal.
    pub fn run_interactive(&mut self) -> Result<()> {
        let mut out = std::io::stdout();
        enable_raw_mode().context("failed to enable raw mode")?;
        let result = self.event_loop(&mut out);
        disable_raw_mode().ok();
        result
    }

    fn event_loop(&mut self, out: &mut impl Write) -> Result<()> {
        let mut line = String::new();
        self.flush_log(out)?;
        self.draw_prompt(out, &line)?;

        loop {
            let Event::Key(key) = event::read().context("failed to read terminal event")? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match determine_key_action(&key, line.is_empty()) {
                KeyAction::InsertChar(ch) => line.push(ch),
                KeyAction::Backspace => {
                    line.pop();
                }
                KeyAction::DeleteToBeginning => line.clear(),
                KeyAction::TriggerCompletion => line = self.console.on_tab(&line),
                KeyAction::HistoryPrevious => line = self.console.on_history_up(),
                KeyAction::HistoryNext => line = self.console.on_history_down(),
                KeyAction::Execute => {
                    queue!(out, Print("\r\n"))?;
                    let submitted = std::mem::take(&mut line);
                    self.execute_line(&submitted);
                }
                KeyAction::ClearScreen => {
                    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
                }
                KeyAction::Exit => {
                    queue!(out, Print("\r\n"))?;
                    out.flush()?;
                    return Ok(());
                }
                KeyAction::Unsupported => {}
            }

            self.console.set_input(&line);
            self.flush_log(out)?;
            self.draw_prompt(out, &line)?;
        }
    }

    /// Evaluate stdin line by line when it is not a terminal.
    pub fn run_piped(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<bool> {
        let mut ok = true;
        for line in input.lines() {
            let line = line.context("failed to read input")?;
            self.execute_line(&line);
            ok &= self.print_plain(out)?;
        }
        Ok(ok)
    }

    /// Print new log lines without styling; false if any was an error.
    pub fn print_plain(&mut self, out: &mut impl Write) -> Result<bool> {
        let mut ok = true;
        for line in self.console.log().drain_new() {
            ok &= line.severity != Severity::Error;
            writeln!(out, "{}", line.text)?;
        }
        Ok(ok)
    }

    /// Print new log lines as JSON objects, one per line.
    pub fn print_json(&mut self, out: &mut impl Write) -> Result<bool> {
        let mut ok = true;
        for line in self.console.log().drain_new() {
            ok &= line.severity != Severity::Error;
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        Ok(ok)
    }

    fn flush_log(&mut self, out: &mut impl Write) -> Result<()> {
        for line in self.console.log().drain_new() {
            queue!(out, Print("\r"), Clear(ClearType::CurrentLine))?;
            let text = line.text.replace('\n', "\r\n");
            queue!(out, Print(text.with(severity_color(line.severity))), Print("\r\n"))?;
        }
        Ok(())
    }

    fn draw_prompt(&mut self, out: &mut impl Write, line: &str) -> Result<()> {
        queue!(
            out,
            Print("\r"),
            Clear(ClearType::CurrentLine),
            Print(PROMPT.with(Color::DarkGreen)),
            Print(line)
        )?;

        let pending = self.console.pending_candidates();
        if !pending.is_empty() {
            let overlay = format!("  [{}]", pending.join(CANDIDATE_SEPARATOR));
            let width = overlay.chars().count();
            match u16::try_from(width) {
                Ok(width) => queue!(
                    out,
                    Print(overlay.with(Color::DarkGrey)),
                    cursor::MoveLeft(width)
                )?,
                Err(_) => warn!("candidate overlay too wide to draw"),
            }
        }
        out.flush()?;
        Ok(())
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Message => Color::Reset,
        Severity::Note => Color::DarkCyan,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
        Severity::Success => Color::Green,
    }
}
