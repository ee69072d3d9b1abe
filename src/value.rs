use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    ast::Stmt,
    diagnostics::{Diagnostic, MuError},
    environment::EnvironmentRef,
};

#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn nil() -> Self {
        Self::new(ValueKind::Nil)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueKind::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new(ValueKind::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()))
    }

    pub fn array(values: Vec<Value>) -> Self {
        Self::new(ValueKind::Array(values))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Self::new(ValueKind::Map(entries))
    }

    pub fn native(
        name: &'static str,
        arity: usize,
        callback: impl Fn(&[Value]) -> Result<Value, MuError> + 'static,
    ) -> Self {
        Self::new(ValueKind::NativeFunction(NativeFunction {
            name,
            arity,
            callback: Rc::new(callback),
        }))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        matches!(&*self.0, ValueKind::Nil)
    }

    pub fn is_truthy(&self) -> bool {
        match &*self.0 {
            ValueKind::Nil => false,
            ValueKind::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            &*self.0,
            ValueKind::Function(_) | ValueKind::NativeFunction(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Nil => "nil",
            ValueKind::Bool(_) => "bool",
            ValueKind::Int(_) | ValueKind::Float(_) => "num",
            ValueKind::String(_) => "str",
            ValueKind::Array(_) | ValueKind::Map(_) => "tbl",
            ValueKind::Function(_) | ValueKind::NativeFunction(_) => "fn",
        }
    }

    /// Source-like representation; nested tables deeper than `depth` are
    /// elided as `[...]`.
    pub fn repr(&self, depth: usize) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, depth);
        out
    }

    fn write_repr(&self, out: &mut String, depth: usize) {
        match &*self.0 {
            ValueKind::String(s) => {
                out.push('"');
                for ch in s.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        '\r' => out.push_str("\\r"),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            ValueKind::Array(_) | ValueKind::Map(_) if depth == 0 => out.push_str("[...]"),
            ValueKind::Array(values) => {
                out.push('[');
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    value.write_repr(out, depth - 1);
                }
                out.push(']');
            }
            ValueKind::Map(map) => {
                out.push('[');
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    value.write_repr(out, depth - 1);
                }
                out.push(']');
            }
            _ => out.push_str(&self.to_string()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr(usize::MAX))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Nil => write!(f, "nil"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Float(n) => write!(f, "{n:?}"),
            ValueKind::String(s) => write!(f, "{s}"),
            ValueKind::Array(values) => {
                write!(f, "[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            ValueKind::Map(map) => {
                write!(f, "[")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "]")
            }
            ValueKind::Function(fun) => write!(
                f,
                "<fn {}>",
                fun.name.as_deref().unwrap_or("anonymous")
            ),
            ValueKind::NativeFunction(fun) => write!(f, "<builtin fn {}>", fun.name),
        }
    }
}

pub enum ValueKind {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
    Function(UserFunction),
    NativeFunction(NativeFunction),
}

pub struct UserFunction {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub env: EnvironmentRef,
}

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub callback: Rc<dyn Fn(&[Value]) -> Result<Value, MuError>>,
}

impl NativeFunction {
    pub fn call(&self, args: &[Value]) -> Result<Value, MuError> {
        if self.arity != usize::MAX && args.len() != self.arity {
            return Err(MuError::from(Diagnostic::runtime(format!(
                "function `{}` expected {} arguments but received {}",
                self.name,
                self.arity,
                args.len()
            ))));
        }
        (self.callback)(args)
    }
}
