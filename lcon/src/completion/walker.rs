//! Segment-by-segment resolution of a dotted path from the global scope.

use crate::runtime::ScopeGraph;
use lcon_types::ConsoleError;
use tracing::debug;

/// Where a walk ended.
#[derive(Debug, Clone)]
pub enum Resolved<H> {
    /// Every segment was looked up
    Complete(H),
    /// A segment was reached on something that is not a scope
    Partial { reached: H, error: ConsoleError },
}

impl<H> Resolved<H> {
    pub fn handle(&self) -> &H {
        match self {
            Resolved::Complete(h) | Resolved::Partial { reached: h, .. } => h,
        }
    }

    pub fn into_handle(self) -> H {
        match self {
            Resolved::Complete(h) | Resolved::Partial { reached: h, .. } => h,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Resolved::Complete(_))
    }
}

/// Use `handle` as a scope, redirecting once through its indirection link
/// when it is not a mapping itself.
pub fn as_scope<G: ScopeGraph>(graph: &G, handle: &G::Handle) -> Option<G::Handle> {
    if graph.is_mapping(handle) {
        return Some(handle.clone());
    }
    graph
        .indirection(handle)
        .filter(|link| graph.is_mapping(link))
}

/// Walk `segments` starting at the global scope. Never fails: an
/// unresolvable segment stops the walk at whatever was reached.
pub fn resolve<G, S>(graph: &G, segments: &[S]) -> Resolved<G::Handle>
where
    G: ScopeGraph,
    S: AsRef<str>,
{
    let mut current = graph.global_scope();
    for segment in segments {
        let segment = segment.as_ref();
        let Some(scope) = as_scope(graph, &current) else {
            let error = ConsoleError::UnresolvedPath {
                segment: segment.to_string(),
            };
            debug!("walk stopped: {}", error);
            return Resolved::Partial {
                reached: current,
                error,
            };
        };
        current = graph.lookup(&scope, segment);
    }
    Resolved::Complete(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::fixture::{Fixture, Node};

    #[test]
    fn test_empty_path_is_global() {
        let graph = Fixture::sample();
        let resolved = resolve::<_, &str>(&graph, &[]);
        assert!(resolved.is_complete());
        assert_eq!(*resolved.handle(), graph.root());
    }

    #[test]
    fn test_nested_lookup() {
        let graph = Fixture::sample();
        let resolved = resolve(&graph, &["outer", "inner"]);
        assert!(resolved.is_complete());
        assert!(graph.is_mapping(resolved.handle()));
        assert_eq!(graph.names(resolved.handle()), vec!["deep"]);
    }

    #[test]
    fn test_missing_segment_stops_early() {
        let graph = Fixture::sample();
        let resolved = resolve(&graph, &["nothing", "below"]);
        match resolved {
            Resolved::Partial { reached, error } => {
                assert_eq!(reached, Node::NIL);
                assert_eq!(
                    error,
                    ConsoleError::UnresolvedPath {
                        segment: "below".into()
                    }
                );
            }
            Resolved::Complete(_) => panic!("walk should stop"),
        }
    }

    #[test]
    fn test_empty_segment_resolves_to_nothing() {
        let graph = Fixture::sample();
        let resolved = resolve(&graph, &["", "x"]);
        assert!(!resolved.is_complete());
    }

    #[test]
    fn test_walk_redirects_through_link() {
        let graph = Fixture::sample();
        // `handle` is a leaf whose link points at the `methods` scope
        let resolved = resolve(&graph, &["handle", "describe"]);
        assert!(resolved.is_complete());
        assert!(!graph.is_mapping(resolved.handle()));
        assert_ne!(*resolved.handle(), Node::NIL);
    }
}
