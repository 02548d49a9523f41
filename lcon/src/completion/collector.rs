//! Candidate enumeration over a scope and its indirection chain.

use super::walker::as_scope;
use crate::runtime::ScopeGraph;
use lcon_types::ConsoleError;
use tracing::debug;

/// Maximum number of scopes visited along one indirection chain.
pub const MAX_INDIRECTION_DEPTH: usize = 10;

/// Names in `handle` (and its indirection chain) starting with `last`.
///
/// Returns `None` when `handle` cannot be used as a scope even after one
/// redirect, so the caller can retry from the global scope. Names starting
/// with `_` are hidden when `last` is empty unless `include_hidden` is set.
/// Names shadowed along the chain are reported once per level.
pub fn collect<G: ScopeGraph>(
    graph: &G,
    handle: &G::Handle,
    last: &str,
    include_hidden: bool,
) -> Option<Vec<String>> {
    let scope = as_scope(graph, handle)?;
    let mut candidates = Vec::new();
    collect_level(
        graph,
        &scope,
        last,
        include_hidden,
        MAX_INDIRECTION_DEPTH,
        &mut candidates,
    );
    Some(candidates)
}

fn collect_level<G: ScopeGraph>(
    graph: &G,
    scope: &G::Handle,
    last: &str,
    include_hidden: bool,
    left: usize,
    candidates: &mut Vec<String>,
) {
    if left == 0 {
        debug!(
            "{}",
            ConsoleError::DepthExhausted {
                limit: MAX_INDIRECTION_DEPTH
            }
        );
        return;
    }

    let hide_private = last.is_empty() && !include_hidden;
    for binding in graph.bindings(scope) {
        if !binding.name.starts_with(last) {
            continue;
        }
        if hide_private && binding.name.starts_with('_') {
            continue;
        }
        candidates.push(binding.name);
    }

    if let Some(next) = graph.indirection(scope)
        && graph.is_mapping(&next)
    {
        collect_level(graph, &next, last, include_hidden, left - 1, candidates);
    }
}
