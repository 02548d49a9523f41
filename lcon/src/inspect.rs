//! Scope inspection and leaf editing.
//!
//! Lists the bindings of a scope as display rows and writes edited string
//! or number values back into their owning scope.

use crate::completion::walker::{Resolved, as_scope, resolve};
use crate::runtime::{Leaf, Runtime};
use lcon_types::{ConsoleError, ConsoleResult, Number, Value, ValueKind};

/// Strings at least this long are previewed as `"..."`
const PREVIEW_MAX_LEN: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct InspectFilter {
    /// Substring the name must contain
    pub search: Option<String>,
    pub hide_functions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRow {
    pub name: String,
    pub kind: ValueKind,
    pub preview: String,
}

fn scope_at<R, S>(runtime: &R, path: &[S]) -> ConsoleResult<R::Handle>
where
    R: Runtime,
    S: AsRef<str>,
{
    let handle = match resolve(runtime, path) {
        Resolved::Complete(handle) => handle,
        Resolved::Partial { error, .. } => return Err(error),
    };
    as_scope(runtime, &handle).ok_or_else(|| ConsoleError::UnresolvedPath {
        segment: path
            .last()
            .map(|s| s.as_ref().to_string())
            .unwrap_or_default(),
    })
}

/// Rows for the bindings of the scope at `path` (empty path = globals).
pub fn inspect<R, S>(runtime: &R, path: &[S], filter: &InspectFilter) -> ConsoleResult<Vec<InspectRow>>
where
    R: Runtime,
    S: AsRef<str>,
{
    let scope = scope_at(runtime, path)?;
    let rows = runtime
        .bindings(&scope)
        .into_iter()
        .filter(|binding| match &filter.search {
            Some(search) => binding.name.contains(search.as_str()),
            None => true,
        })
        .filter(|binding| !(filter.hide_functions && binding.kind == ValueKind::Function))
        .map(|binding| {
            let handle = runtime.lookup(&scope, &binding.name);
            let value = runtime.value_of(&handle);
            let preview = match (&value, runtime.metatable_name(&handle)) {
                (Value::Opaque(_), Some(name)) => format!("{} ({name})", preview(&value)),
                _ => preview(&value),
            };
            InspectRow {
                preview,
                kind: value.kind(),
                name: binding.name,
            }
        })
        .collect();
    Ok(rows)
}

/// Short value text for an inspector row.
pub fn preview(value: &Value) -> String {
    match value {
        Value::String(s) if !s.contains('\n') && s.len() < PREVIEW_MAX_LEN => format!("\"{s}\""),
        Value::String(_) => "\"...\"".to_string(),
        Value::Number(Number::Integer(i)) => format!("{:.6}", *i as f64),
        Value::Number(Number::Float(x)) => format!("{x:.6}"),
        Value::Boolean(b) => b.to_string(),
        Value::Function(addr) | Value::Opaque(addr) => addr.to_string(),
        Value::Table(_) => "--".to_string(),
        Value::Nil | Value::Unknown { .. } => "Unknown".to_string(),
    }
}

/// Replace the string or number bound to `name` in the scope at `path`.
/// Returns whether anything was written; unchanged values are left alone.
pub fn edit_leaf<R, S>(runtime: &R, path: &[S], name: &str, text: &str) -> ConsoleResult<bool>
where
    R: Runtime,
    S: AsRef<str>,
{
    let scope = scope_at(runtime, path)?;
    let current = runtime.value_of(&runtime.lookup(&scope, name));
    let edit_error = |reason: String| ConsoleError::Edit {
        name: name.to_string(),
        reason,
    };

    let leaf = match current {
        Value::String(old) => {
            if old == text {
                return Ok(false);
            }
            Leaf::String(text.to_string())
        }
        Value::Number(Number::Integer(old)) => match text.trim().parse::<i64>() {
            Ok(new) if new == old => return Ok(false),
            Ok(new) => Leaf::Integer(new),
            Err(_) => {
                let new = parse_number(text).map_err(edit_error)?;
                if new == old as f64 {
                    return Ok(false);
                }
                Leaf::Number(new)
            }
        },
        Value::Number(Number::Float(old)) => {
            let new = parse_number(text).map_err(edit_error)?;
            if new == old {
                return Ok(false);
            }
            Leaf::Number(new)
        }
        other => {
            return Err(edit_error(format!(
                "{} values cannot be edited",
                other.type_name()
            )));
        }
    };
    runtime.write_leaf(&scope, name, leaf)?;
    Ok(true)
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", text.trim()))
}

/// Human readable memory figure for the info view.
pub fn format_memory(bytes: usize) -> String {
    let kib = bytes as f64 / 1024.0;
    format!("{:.2} MiB ({:.2} KiB)", kib / 1024.0, kib)
}
