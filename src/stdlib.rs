use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, MuError, Result},
    runtime::Host,
    value::{Value, ValueKind},
};

/// Builds the builtin registry every new scope is seeded from.
pub fn builtins(host: Rc<dyn Host>) -> IndexMap<String, Value> {
    let mut registry = IndexMap::new();

    let printer = Rc::clone(&host);
    registry.insert(
        "print".into(),
        Value::native("print", usize::MAX, move |args| {
            let line = args
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            printer.print(&line);
            Ok(Value::nil())
        }),
    );

    let importer = host;
    registry.insert(
        "import".into(),
        Value::native("import", 1, move |args| {
            let name = expect_string(&args[0], "import")?;
            Ok(importer.import(name).unwrap_or_else(Value::nil))
        }),
    );

    registry.insert("repr".into(), Value::native("repr", usize::MAX, repr));
    registry.insert("len".into(), Value::native("len", 1, len));
    registry.insert("push".into(), Value::native("push", 2, push));
    registry.insert("type".into(), Value::native("type", 1, type_of));
    registry.insert("str".into(), Value::native("str", 1, to_str));
    registry.insert("num".into(), Value::native("num", 1, num));
    registry.insert("error".into(), Value::native("error", usize::MAX, error));
    registry
}

fn repr(args: &[Value]) -> Result<Value> {
    let (value, depth) = match args {
        [value] => (value, 1),
        [value, depth] => match depth.kind() {
            ValueKind::Int(n) if *n >= 0 => (value, *n as usize),
            _ => return Err(builtin_error("repr", "depth must be a non-negative num")),
        },
        _ => return Err(builtin_error("repr", "expected 1 or 2 arguments")),
    };
    Ok(Value::string(value.repr(depth)))
}

fn len(args: &[Value]) -> Result<Value> {
    let count = match args[0].kind() {
        ValueKind::String(s) => s.chars().count(),
        ValueKind::Array(values) => values.len(),
        ValueKind::Map(map) => map.len(),
        _ => {
            return Err(builtin_error(
                "len",
                format!("expected str or tbl, found {}", args[0].type_name()),
            ));
        }
    };
    Ok(Value::int(count as i64))
}

fn push(args: &[Value]) -> Result<Value> {
    match args[0].kind() {
        ValueKind::Array(values) => {
            let mut values = values.clone();
            values.push(args[1].clone());
            Ok(Value::array(values))
        }
        _ => Err(builtin_error(
            "push",
            format!("expected tbl, found {}", args[0].type_name()),
        )),
    }
}

fn type_of(args: &[Value]) -> Result<Value> {
    Ok(Value::string(args[0].type_name()))
}

fn to_str(args: &[Value]) -> Result<Value> {
    Ok(Value::string(args[0].to_string()))
}

fn num(args: &[Value]) -> Result<Value> {
    match args[0].kind() {
        ValueKind::Int(_) | ValueKind::Float(_) => Ok(args[0].clone()),
        ValueKind::String(text) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                Ok(Value::int(n))
            } else if let Ok(n) = text.parse::<f64>() {
                Ok(Value::float(n))
            } else {
                Ok(Value::nil())
            }
        }
        _ => Ok(Value::nil()),
    }
}

fn error(args: &[Value]) -> Result<Value> {
    let message = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    Err(MuError::from(Diagnostic::runtime(message)))
}

fn expect_string<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
    match value.kind() {
        ValueKind::String(s) => Ok(s),
        _ => Err(builtin_error(
            name,
            format!("expected str, found {}", value.type_name()),
        )),
    }
}

fn builtin_error(name: &str, message: impl Into<String>) -> MuError {
    MuError::from(Diagnostic::runtime(format!(
        "{name}: {}",
        message.into()
    )))
}
