//! System functions the stand-alone driver provides to the interpreter:
//! line output and the table of importable namespaces.

use indexmap::IndexMap;

use crate::{
    ast::{Stmt, StmtKind},
    diagnostics::{Diagnostic, MuError, Result},
    runtime::Host,
    value::{UserFunction, Value, ValueKind},
};

pub struct SystemHost {
    imports: IndexMap<String, Value>,
}

impl SystemHost {
    pub fn new() -> Self {
        let mut imports = IndexMap::new();
        imports.insert("dis".to_string(), dis_namespace());
        Self { imports }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SystemHost {
    fn print(&self, text: &str) {
        println!("{text}");
    }

    fn import(&self, name: &str) -> Option<Value> {
        self.imports.get(name).cloned()
    }
}

fn dis_namespace() -> Value {
    let mut exports = IndexMap::new();
    exports.insert(
        "dis".to_string(),
        Value::native("dis", 1, |args| {
            for line in disassemble(&args[0])? {
                println!("{line}");
            }
            Ok(Value::nil())
        }),
    );
    Value::map(exports)
}

/// Renders a listing of a script function's code, one statement per line.
pub fn disassemble(value: &Value) -> Result<Vec<String>> {
    let ValueKind::Function(function) = value.kind() else {
        return Err(MuError::from(Diagnostic::runtime("expected mu function")));
    };
    let mut lines = vec![header(function)];
    let mut offset = 0;
    list_block(&function.body, 1, &mut offset, &mut lines);
    Ok(lines)
}

fn header(function: &UserFunction) -> String {
    format!(
        "fn {}({})",
        function.name.as_deref().unwrap_or("anonymous"),
        function.params.join(", ")
    )
}

fn list_block(block: &[Stmt], depth: usize, offset: &mut usize, lines: &mut Vec<String>) {
    for stmt in block {
        let op = match &stmt.kind {
            StmtKind::Var { name, .. } => format!("var {name}"),
            StmtKind::Function { name, params, .. } => format!("fn {name}({})", params.join(", ")),
            StmtKind::Expr(exprs) => format!("eval {}", exprs.len()),
            StmtKind::If { .. } => "if".to_string(),
            StmtKind::While { .. } => "while".to_string(),
            StmtKind::Return(Some(_)) => "ret 1".to_string(),
            StmtKind::Return(None) => "ret 0".to_string(),
        };
        lines.push(format!(
            "{offset:04}{:indent$}{op:<16} @{}..{}",
            "",
            stmt.span.start,
            stmt.span.end,
            indent = depth * 2
        ));
        *offset += 1;
        match &stmt.kind {
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                list_block(then_branch, depth + 1, offset, lines);
                if let Some(branch) = else_branch {
                    lines.push(format!("{:04}{:indent$}else", offset, "", indent = depth * 2));
                    list_block(branch, depth + 1, offset, lines);
                }
            }
            StmtKind::While { body, .. } | StmtKind::Function { body, .. } => {
                list_block(body, depth + 1, offset, lines);
            }
            _ => {}
        }
    }
}
