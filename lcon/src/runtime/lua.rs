//! Lua 5.4 implementation of the runtime binding surface.

use super::{ChunkMode, Leaf, Runtime, ScopeGraph};
use anyhow::{Context as _, Result};
use lcon_types::{
    Address, Binding, ConsoleError, ConsoleResult, Number, Severity, SharedLog, Value, ValueKind,
};
use mlua::{Function, Lua, MultiValue, Value as LuaValue};
use tracing::debug;

/// Chunk name reported in diagnostics, e.g. `console:1: ...`
pub const CHUNK_NAME: &str = "=console";

const RUNNER_SOURCE: &str = "local pcall = pcall\nreturn function(f) return pcall(f) end";

pub struct LuaRuntime {
    lua: Lua,
    /// `getmetatable` captured at attach time, so user code cannot hide it
    getmetatable: Function,
    /// Protected call wrapper keeping raised values intact
    runner: Function,
}

impl std::fmt::Debug for LuaRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LuaRuntime")
            .field("used_memory", &self.lua.used_memory())
            .finish()
    }
}

impl LuaRuntime {
    pub fn new(log: SharedLog) -> Result<Self> {
        Self::with_lua(Lua::new(), log)
    }

    /// Bind to an existing state and register the `echo` global on it.
    pub fn with_lua(lua: Lua, log: SharedLog) -> Result<Self> {
        let getmetatable: Function = lua
            .globals()
            .raw_get("getmetatable")
            .context("base library is not loaded")?;
        let runner: Function = lua
            .load(RUNNER_SOURCE)
            .set_name("=runner")
            .eval()
            .context("failed to build chunk runner")?;

        let echo = lua
            .create_function(move |_, text: String| {
                log.print_line(text, Severity::Message);
                Ok(())
            })
            .context("failed to create echo")?;
        lua.globals()
            .set("echo", echo)
            .context("failed to register echo")?;

        debug!("lua runtime attached");
        Ok(Self {
            lua,
            getmetatable,
            runner,
        })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Bytes currently allocated by the Lua state.
    pub fn memory_usage(&self) -> usize {
        self.lua.used_memory()
    }

    pub fn collect_garbage(&self) -> Result<()> {
        self.lua.gc_collect().context("garbage collection failed")
    }
}

impl ScopeGraph for LuaRuntime {
    type Handle = LuaValue;

    fn global_scope(&self) -> LuaValue {
        LuaValue::Table(self.lua.globals())
    }

    fn is_mapping(&self, handle: &LuaValue) -> bool {
        matches!(handle, LuaValue::Table(_))
    }

    fn bindings(&self, handle: &LuaValue) -> Vec<Binding> {
        let LuaValue::Table(table) = handle else {
            return Vec::new();
        };
        let table = table.clone();
        let mut bindings = Vec::new();
        for pair in table.pairs::<LuaValue, LuaValue>() {
            match pair {
                Ok((LuaValue::String(key), value)) => {
                    bindings.push(Binding::new(key.to_string_lossy(), kind_of(&value)));
                }
                Ok(_) => {}
                Err(err) => {
                    debug!("enumeration stopped: {}", err);
                    break;
                }
            }
        }
        bindings
    }

    fn lookup(&self, handle: &LuaValue, name: &str) -> LuaValue {
        let LuaValue::Table(table) = handle else {
            return LuaValue::Nil;
        };
        let value: mlua::Result<LuaValue> = table.get(name);
        value.unwrap_or_else(|err| {
            debug!("lookup of '{}' failed: {}", name, err);
            LuaValue::Nil
        })
    }

    fn indirection(&self, handle: &LuaValue) -> Option<LuaValue> {
        self.meta_field(handle, "__index")
    }
}

impl LuaRuntime {
    /// Field of the value's real metatable. Tables and userdata are read
    /// directly, so a `__metatable` guard does not hide the field.
    fn meta_field(&self, handle: &LuaValue, field: &str) -> Option<LuaValue> {
        let value: mlua::Result<LuaValue> = match handle {
            LuaValue::Table(table) => table.metatable()?.raw_get(field),
            LuaValue::UserData(ud) => ud
                .metatable()
                .and_then(|metatable| metatable.get::<LuaValue>(field))
                .or_else(|err| {
                    debug!("userdata metatable not readable directly: {}", err);
                    self.public_meta_field(handle, field)
                }),
            _ => self.public_meta_field(handle, field),
        };
        match value {
            Ok(LuaValue::Nil) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }

    /// Metatable field as seen through `getmetatable`, e.g. for strings.
    fn public_meta_field(&self, handle: &LuaValue, field: &str) -> mlua::Result<LuaValue> {
        let metatable: LuaValue = self.getmetatable.call(handle.clone())?;
        match metatable {
            LuaValue::Table(metatable) => metatable.raw_get(field),
            _ => Ok(LuaValue::Nil),
        }
    }
}

impl Runtime for LuaRuntime {
    type Chunk = Function;

    fn compile(&self, source: &str, mode: ChunkMode) -> Result<Function, String> {
        let code = match mode {
            ChunkMode::Expression => format!("return {source}"),
            ChunkMode::Statement => source.to_string(),
        };
        self.lua
            .load(code)
            .set_name(CHUNK_NAME)
            .into_function()
            .map_err(|err| match err {
                mlua::Error::SyntaxError { message, .. } => message,
                other => other.to_string(),
            })
    }

    fn execute(&self, chunk: Function) -> Result<Vec<Value>, Value> {
        let results: MultiValue = self
            .runner
            .call(chunk)
            .map_err(|err| Value::String(error_text(&err)))?;
        let mut results = results.into_iter();
        match results.next() {
            Some(LuaValue::Boolean(true)) => Ok(results.map(|v| capture(&v)).collect()),
            Some(LuaValue::Boolean(false)) => {
                Err(results.next().map(|v| capture(&v)).unwrap_or(Value::Nil))
            }
            other => Err(Value::String(format!(
                "unexpected runner status: {}",
                other.map(|v| v.type_name()).unwrap_or("none")
            ))),
        }
    }

    fn write_leaf(&self, scope: &LuaValue, name: &str, leaf: Leaf) -> ConsoleResult<()> {
        let LuaValue::Table(table) = scope else {
            return Err(ConsoleError::Edit {
                name: name.to_string(),
                reason: "owning scope is not a table".to_string(),
            });
        };
        let result = match leaf {
            Leaf::String(text) => table.set(name, text),
            Leaf::Integer(number) => table.set(name, number),
            Leaf::Number(number) => table.set(name, number),
        };
        result.map_err(|err| ConsoleError::Edit {
            name: name.to_string(),
            reason: err.to_string(),
        })
    }

    fn value_of(&self, handle: &LuaValue) -> Value {
        capture(handle)
    }

    fn metatable_name(&self, handle: &LuaValue) -> Option<String> {
        match self.meta_field(handle, "__name")? {
            LuaValue::String(name) => Some(name.to_string_lossy().into()),
            _ => None,
        }
    }
}

fn kind_of(value: &LuaValue) -> ValueKind {
    match value {
        LuaValue::Nil => ValueKind::Nil,
        LuaValue::Boolean(_) => ValueKind::Boolean,
        LuaValue::Integer(_) | LuaValue::Number(_) => ValueKind::Number,
        LuaValue::String(_) => ValueKind::String,
        LuaValue::Table(_) => ValueKind::Table,
        LuaValue::Function(_) => ValueKind::Function,
        LuaValue::UserData(_) | LuaValue::LightUserData(_) => ValueKind::Opaque,
        _ => ValueKind::Unknown,
    }
}

/// Message of an error without the traceback added around callback
/// failures.
fn error_text(err: &mlua::Error) -> String {
    match err {
        mlua::Error::CallbackError { cause, .. } => error_text(cause),
        other => other.to_string(),
    }
}

/// Convert a Lua value into the closed value model.
fn capture(value: &LuaValue) -> Value {
    let address = Address(value.to_pointer() as usize);
    match value {
        LuaValue::Nil => Value::Nil,
        LuaValue::Boolean(b) => Value::Boolean(*b),
        LuaValue::Integer(i) => Value::Number(Number::Integer(*i)),
        LuaValue::Number(n) => Value::Number(Number::Float(*n)),
        LuaValue::String(s) => Value::String(s.to_string_lossy().into()),
        LuaValue::Table(_) => Value::Table(address),
        LuaValue::Function(_) => Value::Function(address),
        LuaValue::UserData(_) | LuaValue::LightUserData(_) => Value::Opaque(address),
        LuaValue::Error(err) => Value::String(error_text(err)),
        other => Value::Unknown {
            type_name: other.type_name(),
            address,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> Result<(LuaRuntime, SharedLog)> {
        let log = SharedLog::with_capacity(64);
        Ok((LuaRuntime::new(log.clone())?, log))
    }

    fn run(rt: &LuaRuntime, code: &str) -> Result<Vec<Value>, Value> {
        let chunk = rt
            .compile(code, ChunkMode::Statement)
            .map_err(Value::String)?;
        rt.execute(chunk)
    }

    #[test]
    fn test_bindings_only_string_keys() -> Result<()> {
        let (rt, _) = runtime()?;
        run(&rt, "t = { alpha = 1, beta = 'x', [1] = true, gamma = {} }").ok();
        let t = rt.lookup(&rt.global_scope(), "t");
        let mut names: Vec<(String, ValueKind)> = rt
            .bindings(&t)
            .into_iter()
            .map(|b| (b.name, b.kind))
            .collect();
        names.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            names,
            vec![
                ("alpha".to_string(), ValueKind::Number),
                ("beta".to_string(), ValueKind::String),
                ("gamma".to_string(), ValueKind::Table),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_lookup_missing_is_not_a_mapping() -> Result<()> {
        let (rt, _) = runtime()?;
        let missing = rt.lookup(&rt.global_scope(), "does_not_exist");
        assert!(!rt.is_mapping(&missing));
        let empty = rt.lookup(&rt.global_scope(), "");
        assert!(!rt.is_mapping(&empty));
        Ok(())
    }

    #[test]
    fn test_indirection_follows_index_table() -> Result<()> {
        let (rt, _) = runtime()?;
        run(
            &rt,
            "base = { shared = 1 } obj = setmetatable({}, { __index = base })",
        )
        .ok();
        let obj = rt.lookup(&rt.global_scope(), "obj");
        let link = rt.indirection(&obj).expect("obj has an __index link");
        assert!(rt.is_mapping(&link));
        assert_eq!(rt.bindings(&link)[0].name, "shared");

        let plain = rt.lookup(&rt.global_scope(), "base");
        assert!(rt.indirection(&plain).is_none());
        Ok(())
    }

    #[test]
    fn test_strings_link_to_string_library() -> Result<()> {
        let (rt, _) = runtime()?;
        run(&rt, "greeting = 'hello'").ok();
        let greeting = rt.lookup(&rt.global_scope(), "greeting");
        let link = rt.indirection(&greeting).expect("strings have a metatable");
        assert!(rt.bindings(&link).iter().any(|b| b.name == "upper"));
        Ok(())
    }

    #[test]
    fn test_incomplete_chunk_diagnostic() -> Result<()> {
        let (rt, _) = runtime()?;
        let err = rt
            .compile("x = 1 +", ChunkMode::Statement)
            .expect_err("chunk is incomplete");
        assert!(err.ends_with("<eof>"), "{err}");
        Ok(())
    }

    #[test]
    fn test_execute_returns_all_values() -> Result<()> {
        let (rt, _) = runtime()?;
        let chunk = rt
            .compile("1 + 1, 'two', nil", ChunkMode::Expression)
            .map_err(anyhow::Error::msg)?;
        let values = rt.execute(chunk).map_err(|v| anyhow::anyhow!(v.render()))?;
        assert_eq!(
            values,
            vec![
                Value::Number(Number::Integer(2)),
                Value::String("two".into()),
                Value::Nil
            ]
        );
        Ok(())
    }

    #[test]
    fn test_execute_keeps_raised_value() -> Result<()> {
        let (rt, _) = runtime()?;
        let raised = run(&rt, "error({})").expect_err("error is raised");
        assert_eq!(raised.kind(), ValueKind::Table);

        let raised = run(&rt, "error('boom')").expect_err("error is raised");
        assert_eq!(raised, Value::String("console:1: boom".into()));
        Ok(())
    }

    #[test]
    fn test_echo_writes_message_line() -> Result<()> {
        let (rt, log) = runtime()?;
        run(&rt, "echo('hi there')").ok();
        let line = log.last().expect("echo logged a line");
        assert_eq!(line.text, "hi there");
        assert_eq!(line.severity, Severity::Message);
        Ok(())
    }

    #[test]
    fn test_write_leaf_updates_scope() -> Result<()> {
        let (rt, _) = runtime()?;
        run(&rt, "cfg = { name = 'a', size = 1 }").ok();
        let cfg = rt.lookup(&rt.global_scope(), "cfg");
        rt.write_leaf(&cfg, "name", Leaf::String("b".into()))?;
        rt.write_leaf(&cfg, "size", Leaf::Number(2.5))?;
        assert_eq!(
            rt.value_of(&rt.lookup(&cfg, "name")),
            Value::String("b".into())
        );
        assert_eq!(
            rt.value_of(&rt.lookup(&cfg, "size")),
            Value::Number(Number::Float(2.5))
        );

        let not_a_table = rt.lookup(&cfg, "name");
        assert!(rt.write_leaf(&not_a_table, "x", Leaf::Number(1.0)).is_err());
        Ok(())
    }

    #[test]
    fn test_garbage_collection() -> Result<()> {
        let (rt, _) = runtime()?;
        assert!(rt.memory_usage() > 0);
        rt.collect_garbage()
    }

    #[test]
    fn test_indirection_ignores_metatable_guard() -> Result<()> {
        let (rt, _) = runtime()?;
        run(
            &rt,
            "guarded = setmetatable({}, { __index = { greet = 1 }, __metatable = 'locked' })",
        )
        .ok();
        let guarded = rt.lookup(&rt.global_scope(), "guarded");
        let link = rt.indirection(&guarded).expect("guard does not hide __index");
        assert_eq!(rt.bindings(&link)[0].name, "greet");
        Ok(())
    }

    #[test]
    fn test_userdata_metatable() -> Result<()> {
        let (rt, _) = runtime()?;
        let io = rt.lookup(&rt.global_scope(), "io");
        let stdout = rt.lookup(&io, "stdout");
        assert_eq!(rt.metatable_name(&stdout), Some("FILE*".to_string()));
        let methods = rt.indirection(&stdout).expect("files have methods");
        assert!(rt.bindings(&methods).iter().any(|b| b.name == "write"));

        assert_eq!(rt.metatable_name(&io), None);
        Ok(())
    }

    #[test]
    fn test_callback_error_has_no_traceback() -> Result<()> {
        let (rt, _) = runtime()?;
        let raised = run(&rt, "echo(nil)").expect_err("echo needs a string");
        let Value::String(message) = raised else {
            panic!("expected a string error, got {raised:?}");
        };
        assert!(message.contains("bad argument #1"), "{message}");
        assert!(!message.contains('\n'), "{message}");
        Ok(())
    }
}
