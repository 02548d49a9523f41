//! Closed value model used for rendering evaluation results.
//!
//! The runtime converts whatever it produced into [`Value`] before the
//! console sees it, so rendering never inspects runtime type tags.

use std::fmt;

/// Identity of a reference value, printed like a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub usize);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Runtime-visible kind of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Nil,
    Function,
    Table,
    Opaque,
    Unknown,
}

impl ValueKind {
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Nil => "nil",
            ValueKind::Function => "function",
            ValueKind::Table => "table",
            ValueKind::Opaque => "userdata",
            ValueKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A name bound in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: ValueKind,
}

impl Binding {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(Number),
    String(String),
    Function(Address),
    Table(Address),
    Opaque(Address),
    /// Anything the closed model has no variant for (threads, cdata...).
    Unknown {
        type_name: &'static str,
        address: Address,
    },
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Function(_) => ValueKind::Function,
            Value::Table(_) => ValueKind::Table,
            Value::Opaque(_) => ValueKind::Opaque,
            Value::Unknown { .. } => ValueKind::Unknown,
        }
    }

    /// The runtime's own name for the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unknown { type_name, .. } => type_name,
            other => other.kind().label(),
        }
    }

    /// Console rendering of a single evaluation result.
    pub fn render(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("'{s}'"),
            Value::Boolean(b) => b.to_string(),
            Value::Nil => "nil".to_string(),
            Value::Function(addr) | Value::Table(addr) | Value::Opaque(addr) => {
                format!("{}: {}", self.type_name(), addr)
            }
            Value::Unknown { type_name, address } => format!("{type_name}: {address}"),
        }
    }

    /// Text of a raised error value.
    pub fn error_message(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => format!("(non string error value - {})", other.type_name()),
        }
    }
}

/// Render all values left to right, separated by single spaces.
pub fn render_all(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::render)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a float the way Lua's `tostring` does (`%.14g`, plus `.0` for
/// integral values).
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return if x.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    const PRECISION: i32 = 14;
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    let mut out = if exp < -4 || exp >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    };

    if !out.contains(['.', 'e', 'n', 'i']) {
        out.push_str(".0");
    }
    out
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
