//! Symbol completion over the runtime's scope graph.
//!
//! The pipeline runs fresh on every request:
//! input → [`normalize`] → [`resolve`] → [`collect`] → [`common_prefix`].

use crate::runtime::ScopeGraph;
use tracing::debug;

pub mod collector;
#[cfg(test)]
pub(crate) mod fixture;
pub mod normalize;
pub mod prefix;
pub mod walker;

pub use collector::{MAX_INDIRECTION_DEPTH, collect};
pub use normalize::{SymbolPath, normalize};
pub use prefix::common_prefix;
pub use walker::{Resolved, resolve};

/// Result of one completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// New input text
    pub text: String,
    /// Choices to display; empty when the input was extended or nothing
    /// matched
    pub candidates: Vec<String>,
}

impl Completion {
    fn unchanged(input: &str) -> Self {
        Completion {
            text: input.to_string(),
            candidates: Vec::new(),
        }
    }

    fn extended(input: &str, suffix: &str) -> Self {
        Completion {
            text: format!("{input}{suffix}"),
            candidates: Vec::new(),
        }
    }
}

/// Candidate names for the trailing path of `input`.
pub fn candidates<G: ScopeGraph>(graph: &G, path: &SymbolPath) -> Vec<String> {
    let resolved = resolve(graph, &path.segments);
    if let Some(found) = collect(graph, resolved.handle(), &path.last, false) {
        return found;
    }
    debug!("no scope at {:?}, retrying from global", path.segments);
    collect(graph, &graph.global_scope(), &path.last, false).unwrap_or_default()
}

/// Compute the next input state for a completion request on `input`.
pub fn complete<G: ScopeGraph>(graph: &G, input: &str) -> Completion {
    let path = normalize(input);
    let found = candidates(graph, &path);
    debug!("completing {:?}: {} candidates", path, found.len());

    match found.as_slice() {
        [] => Completion::unchanged(input),
        [only] => Completion::extended(input, &only[path.last.len()..]),
        _ => {
            let prefix = common_prefix(&found);
            if prefix.len() <= path.last.len() {
                Completion {
                    text: input.to_string(),
                    candidates: found,
                }
            } else {
                Completion::extended(input, &prefix[path.last.len()..])
            }
        }
    }
}
