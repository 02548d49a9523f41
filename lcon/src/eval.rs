//! Two-phase evaluation of console input.
//!
//! Input is first compiled as an expression so its values can be shown,
//! then as a plain statement. Compile failures that only mean "more input
//! expected" are reported as [`ConsoleError::CompileIncomplete`] and kept
//! out of the log by the caller.

use crate::runtime::{ChunkMode, Runtime};
use lcon_types::{ConsoleError, ConsoleResult, Value};
use tracing::{debug, trace};

/// Diagnostic suffix marking a chunk that ended while more tokens were
/// expected.
pub const INCOMPLETE_MARKER: &str = "<eof>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalState {
    Idle,
    Compiling,
    Compiled(ChunkMode),
    CompileFailed,
    Executing,
    Success,
    RuntimeError,
}

pub fn is_incomplete(diagnostic: &str) -> bool {
    diagnostic.ends_with(INCOMPLETE_MARKER)
}

#[derive(Debug)]
pub struct Evaluator {
    state: EvalState,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            state: EvalState::Idle,
        }
    }

    pub fn state(&self) -> EvalState {
        self.state
    }

    fn transition(&mut self, next: EvalState) {
        trace!("eval state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Evaluate `input` and return the values it produced, in order.
    /// The evaluator is back in [`EvalState::Idle`] when this returns.
    pub fn evaluate<R: Runtime>(&mut self, runtime: &R, input: &str) -> ConsoleResult<Vec<Value>> {
        let result = self.run(runtime, input);
        if let Err(err) = &result {
            debug!("evaluation of {:?} failed: {}", input, err);
        }
        self.transition(EvalState::Idle);
        result
    }

    fn run<R: Runtime>(&mut self, runtime: &R, input: &str) -> ConsoleResult<Vec<Value>> {
        self.transition(EvalState::Compiling);
        let chunk = match runtime.compile(input, ChunkMode::Expression) {
            Ok(chunk) => {
                self.transition(EvalState::Compiled(ChunkMode::Expression));
                chunk
            }
            Err(_) => match runtime.compile(input, ChunkMode::Statement) {
                Ok(chunk) => {
                    self.transition(EvalState::Compiled(ChunkMode::Statement));
                    chunk
                }
                Err(diagnostic) => {
                    self.transition(EvalState::CompileFailed);
                    return Err(if is_incomplete(&diagnostic) {
                        ConsoleError::CompileIncomplete(diagnostic)
                    } else {
                        ConsoleError::CompileError(diagnostic)
                    });
                }
            },
        };

        self.transition(EvalState::Executing);
        match runtime.execute(chunk) {
            Ok(values) => {
                self.transition(EvalState::Success);
                Ok(values)
            }
            Err(raised) => {
                self.transition(EvalState::RuntimeError);
                Err(ConsoleError::RuntimeError(raised.error_message()))
            }
        }
    }
}
