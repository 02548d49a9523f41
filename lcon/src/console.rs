//! The console a host application drives.
//!
//! Every entry point works on an explicitly passed console; nothing is
//! looked up from ambient runtime state.

use crate::completion;
use crate::environment::ConsoleConfig;
use crate::eval::Evaluator;
use crate::history::History;
use crate::runtime::Runtime;
use lcon_types::value::render_all;
use lcon_types::{ConsoleError, Severity, SharedLog};
use tracing::{debug, warn};

type InputListener = Box<dyn FnMut(&str)>;

pub struct Console<R: Runtime> {
    runtime: Option<R>,
    log: SharedLog,
    history: History,
    evaluator: Evaluator,
    pending: Vec<String>,
    input: String,
    input_listener: Option<InputListener>,
}

impl<R: Runtime> std::fmt::Debug for Console<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("attached", &self.runtime.is_some())
            .field("history", &self.history)
            .field("pending", &self.pending)
            .field("input", &self.input)
            .finish()
    }
}

impl<R: Runtime> Console<R> {
    /// A console with no runtime bound yet.
    pub fn new(config: &ConsoleConfig) -> Self {
        Self::with_log(config, SharedLog::with_capacity(config.max_log_lines))
    }

    /// Use an existing log, e.g. one the runtime's `echo` already writes to.
    pub fn with_log(config: &ConsoleConfig, log: SharedLog) -> Self {
        Console {
            runtime: None,
            log,
            history: History::with_capacity(config.history_capacity),
            evaluator: Evaluator::new(),
            pending: Vec::new(),
            input: String::new(),
            input_listener: None,
        }
    }

    pub fn attach(&mut self, runtime: R) {
        self.runtime = Some(runtime);
    }

    pub fn detach(&mut self) -> Option<R> {
        self.pending.clear();
        self.runtime.take()
    }

    pub fn runtime(&self) -> Option<&R> {
        self.runtime.as_ref()
    }

    pub fn log(&self) -> &SharedLog {
        &self.log
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Candidates the host should show next to the input line.
    pub fn pending_candidates(&self) -> &[String] {
        &self.pending
    }

    /// Called with the new text whenever the console replaces the input.
    pub fn set_input_listener(&mut self, listener: impl FnMut(&str) + 'static) {
        self.input_listener = Some(Box::new(listener));
    }

    pub fn print_line(&self, text: impl Into<String>, severity: Severity) {
        self.log.print_line(text, severity);
    }

    /// Host edited the line directly.
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn replace_input(&mut self, text: String) -> String {
        if text != self.input {
            self.input = text;
            if let Some(listener) = self.input_listener.as_mut() {
                listener(&self.input);
            }
        }
        self.input.clone()
    }

    pub fn on_tab(&mut self, current: &str) -> String {
        self.input = current.to_string();
        let Some(runtime) = self.runtime.as_ref() else {
            self.pending.clear();
            self.print_line(
                "no runtime bound, no completion available",
                Severity::Error,
            );
            return self.input.clone();
        };

        let completion = completion::complete(runtime, current);
        if completion.candidates.len() > 1 {
            self.print_line(completion.candidates.join(" "), Severity::Note);
        }
        self.pending = completion.candidates;
        self.replace_input(completion.text)
    }

    pub fn on_history_up(&mut self) -> String {
        let text = self.history.back();
        self.replace_input(text)
    }

    pub fn on_history_down(&mut self) -> String {
        let text = self.history.forward();
        self.replace_input(text)
    }

    /// Evaluate `text`, record it, and clear the input line.
    pub fn on_submit(&mut self, text: &str) {
        self.pending.clear();
        self.run_command(text);
        self.history.submit(text);
        self.replace_input(String::new());
    }

    /// Evaluate without touching history or the input line.
    pub fn run_command(&mut self, text: &str) {
        let Some(runtime) = self.runtime.as_ref() else {
            self.print_line(
                "no runtime bound, commands have no effect",
                Severity::Error,
            );
            debug!("{}", ConsoleError::NoRuntimeBound);
            return;
        };

        match self.evaluator.evaluate(runtime, text) {
            Ok(values) => {
                if !values.is_empty() {
                    self.log.print_line(render_all(&values), Severity::Message);
                }
            }
            Err(err) if err.is_silent() => {
                debug!("suppressed: {}", err);
            }
            Err(err) => {
                warn!("command failed: {}", err);
                self.log.print_line(err.to_string(), Severity::Error);
            }
        }
    }
}
