//! Runtime binding surface.
//!
//! The completion engine only needs to read the scope graph
//! ([`ScopeGraph`]); the evaluator additionally compiles and runs chunks
//! ([`Runtime`]). Handles are borrowed for the duration of one call and
//! never kept between calls.

use lcon_types::{Binding, ConsoleResult, Value};

pub mod lua;
pub use lua::LuaRuntime;

/// Read access to a graph of scopes reachable from a global root.
pub trait ScopeGraph {
    type Handle: Clone;

    fn global_scope(&self) -> Self::Handle;

    /// Whether the handle can be enumerated and indexed directly.
    fn is_mapping(&self, handle: &Self::Handle) -> bool;

    /// Bindings with textual names, in the scope's own enumeration order.
    /// Non-mappings have no bindings.
    fn bindings(&self, handle: &Self::Handle) -> Vec<Binding>;

    /// Value bound to `name`. Missing names and lookup failures yield a
    /// handle that is not a mapping (nil).
    fn lookup(&self, handle: &Self::Handle, name: &str) -> Self::Handle;

    /// Fallback scope consulted when the handle itself does not resolve a
    /// name.
    fn indirection(&self, handle: &Self::Handle) -> Option<Self::Handle>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    /// `return <input>`, so the values become observable
    Expression,
    Statement,
}

/// Scalar accepted by the leaf write-back path.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    String(String),
    Integer(i64),
    Number(f64),
}

pub trait Runtime: ScopeGraph {
    type Chunk;

    /// Compile `source`. The error is the runtime's diagnostic text.
    fn compile(&self, source: &str, mode: ChunkMode) -> Result<Self::Chunk, String>;

    /// Run a compiled chunk with no arguments. The error is the raised value.
    fn execute(&self, chunk: Self::Chunk) -> Result<Vec<Value>, Value>;

    /// Overwrite an existing binding of `scope`.
    fn write_leaf(&self, scope: &Self::Handle, name: &str, leaf: Leaf) -> ConsoleResult<()>;

    /// Current value of a binding, converted for display.
    fn value_of(&self, handle: &Self::Handle) -> Value;

    /// `__name` of the value's metatable, if it is a string.
    fn metatable_name(&self, handle: &Self::Handle) -> Option<String>;
}
