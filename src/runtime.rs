use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::{
    ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, Stmt, StmtKind, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, MuError, Result, SourceSpan},
    engine::{Engine, EvalMode},
    environment::{Environment, EnvironmentRef, Scope},
    parser, stdlib,
    value::{UserFunction, Value, ValueKind},
};

/// System functions the embedding program supplies to the interpreter.
pub trait Host {
    /// Writes one line of program output.
    fn print(&self, text: &str);

    /// Resolves an importable namespace by name.
    fn import(&self, name: &str) -> Option<Value>;
}

pub struct Interpreter {
    env: EnvironmentRef,
    builtins: IndexMap<String, Value>,
}

impl Interpreter {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            env: Environment::new(),
            builtins: stdlib::builtins(host),
        }
    }

    pub fn builtins(&self) -> &IndexMap<String, Value> {
        &self.builtins
    }

    /// Convenience for embedding and tests: evaluate text against `scope`
    /// and capture the trailing values.
    pub fn eval_source(&mut self, source: &str, scope: &mut Scope) -> Result<Value> {
        self.evaluate(source.as_bytes(), scope, EvalMode::Capture)
    }

    fn run_program(&mut self, items: &[Stmt], mode: EvalMode) -> Result<Value> {
        let mut captured: Vec<Value> = Vec::new();
        for stmt in items {
            match self.execute_statement(stmt)? {
                FlowControl::Next => captured.clear(),
                FlowControl::Values(values) => captured = values,
                FlowControl::Return(value) => {
                    captured = vec![value];
                    break;
                }
            }
        }
        Ok(match mode {
            EvalMode::Statements => Value::nil(),
            EvalMode::Capture => Value::array(captured),
        })
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<FlowControl> {
        match &stmt.kind {
            StmtKind::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::nil(),
                };
                self.env.borrow_mut().define(name.clone(), value);
                Ok(FlowControl::Next)
            }
            StmtKind::Function { name, params, body } => {
                let function = UserFunction {
                    name: Some(name.clone()),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    env: Rc::clone(&self.env),
                };
                self.env
                    .borrow_mut()
                    .define(name.clone(), Value::new(ValueKind::Function(function)));
                Ok(FlowControl::Next)
            }
            StmtKind::Expr(exprs) => {
                let mut values = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    values.push(self.evaluate_expr(expr)?);
                }
                Ok(FlowControl::Values(values))
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(branch) = else_branch {
                    self.execute_block(branch)
                } else {
                    Ok(FlowControl::Next)
                }
            }
            StmtKind::While { condition, body } => {
                while self.evaluate_expr(condition)?.is_truthy() {
                    if let FlowControl::Return(value) = self.execute_block(body)? {
                        return Ok(FlowControl::Return(value));
                    }
                }
                Ok(FlowControl::Next)
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::nil(),
                };
                Ok(FlowControl::Return(value))
            }
        }
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<FlowControl> {
        let child = Environment::with_parent(Rc::clone(&self.env));
        let prev = std::mem::replace(&mut self.env, child);
        let result = self.execute_sequence(statements);
        self.env = prev;
        result
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> Result<FlowControl> {
        let mut last = FlowControl::Next;
        for stmt in statements {
            match self.execute_statement(stmt)? {
                FlowControl::Return(value) => return Ok(FlowControl::Return(value)),
                other => last = other,
            }
        }
        Ok(last)
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal(lit)),
            ExprKind::Variable(name) => Environment::get(&self.env, name, expr.span),
            ExprKind::Binary { op, left, right } => {
                let left_value = self.evaluate_expr(left)?;
                let right_value = self.evaluate_expr(right)?;
                binary(*op, &left_value, &right_value, expr.span)
            }
            ExprKind::Logical { op, left, right } => {
                let left_value = self.evaluate_expr(left)?;
                match (op, left_value.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left_value),
                    _ => self.evaluate_expr(right),
                }
            }
            ExprKind::Unary { op, expr: operand } => {
                let value = self.evaluate_expr(operand)?;
                match (op, value.kind()) {
                    (UnaryOp::Not, _) => Ok(Value::bool(!value.is_truthy())),
                    (UnaryOp::Negate, ValueKind::Int(n)) => Ok(Value::int(n.wrapping_neg())),
                    (UnaryOp::Negate, ValueKind::Float(n)) => Ok(Value::float(-n)),
                    (UnaryOp::Negate, _) => Err(runtime_error(
                        format!("unary `-` expects num, found {}", value.type_name()),
                        expr.span,
                    )),
                }
            }
            ExprKind::Assign { name, value } => {
                let value = self.evaluate_expr(value)?;
                Environment::assign(&self.env, name, value.clone(), expr.span)?;
                Ok(value)
            }
            ExprKind::Call { callee, args } => {
                let callee_value = self.evaluate_expr(callee)?;
                let mut eval_args = Vec::with_capacity(args.len());
                for arg in args {
                    eval_args.push(self.evaluate_expr(arg)?);
                }
                self.call_value(&callee_value, eval_args, expr.span)
            }
            ExprKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate_expr(element)?);
                }
                Ok(Value::array(values))
            }
            ExprKind::Index { target, index } => {
                let target_value = self.evaluate_expr(target)?;
                let index_value = self.evaluate_expr(index)?;
                index_into(&target_value, &index_value, expr.span)
            }
            ExprKind::Field { target, field } => {
                let target_value = self.evaluate_expr(target)?;
                match target_value.kind() {
                    ValueKind::Map(map) => Ok(map.get(field).cloned().unwrap_or_else(Value::nil)),
                    _ => Err(runtime_error(
                        format!("cannot access field `{field}` of {}", target_value.type_name()),
                        expr.span,
                    )),
                }
            }
            ExprKind::Lambda { params, body } => {
                let function = UserFunction {
                    name: None,
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    env: Rc::clone(&self.env),
                };
                Ok(Value::new(ValueKind::Function(function)))
            }
        }
    }

    fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: SourceSpan) -> Result<Value> {
        match callee.kind() {
            ValueKind::NativeFunction(fun) => fun.call(&args),
            ValueKind::Function(fun) => {
                trace!(name = ?fun.name, argc = args.len(), "calling function");
                let frame = Environment::with_parent(Rc::clone(&fun.env));
                {
                    let mut frame = frame.borrow_mut();
                    let mut args = args.into_iter();
                    // Missing arguments are nil and extra ones are dropped.
                    for name in &fun.params {
                        frame.define(name.clone(), args.next().unwrap_or_else(Value::nil));
                    }
                }
                let body = Rc::clone(&fun.body);
                let prev = std::mem::replace(&mut self.env, frame);
                let result = self.execute_sequence(&body);
                self.env = prev;
                match result? {
                    FlowControl::Next => Ok(Value::nil()),
                    FlowControl::Values(mut values) => Ok(values.pop().unwrap_or_else(Value::nil)),
                    FlowControl::Return(value) => Ok(value),
                }
            }
            _ => Err(runtime_error(
                format!("{} value is not callable", callee.type_name()),
                span,
            )),
        }
    }
}

impl Engine for Interpreter {
    type Value = Value;
    type Scope = Scope;

    fn scope(&self) -> Scope {
        Scope::extend(&self.builtins)
    }

    fn evaluate(&mut self, source: &[u8], scope: &mut Scope, mode: EvalMode) -> Result<Value> {
        let source = std::str::from_utf8(source).map_err(|err| {
            MuError::from(Diagnostic::new(
                DiagnosticKind::Lexer,
                format!("source is not valid utf-8 (byte {})", err.valid_up_to()),
            ))
        })?;
        let program = parser::parse_program(source)?;
        self.env = Rc::clone(scope.env());
        self.run_program(&program.items, mode)
    }

    fn lookup(&self, scope: &Scope, name: &str) -> Option<Value> {
        scope.lookup(name)
    }

    fn is_callable(&self, value: &Value) -> bool {
        value.is_callable()
    }

    fn call(&mut self, function: &Value, argument: Value) -> Result<Value> {
        self.call_value(function, vec![argument], SourceSpan::default())
    }

    fn represent(&self, value: &Value, depth: usize) -> Result<String> {
        Ok(value.repr(depth))
    }

    fn text(&self, text: &str) -> Value {
        Value::string(text)
    }

    fn list(&self, items: Vec<Value>) -> Value {
        Value::array(items)
    }

    fn exit_code(&self, value: &Value) -> Result<i32> {
        match value.kind() {
            ValueKind::Nil => Ok(0),
            ValueKind::Int(n) => Ok(*n as i32),
            ValueKind::Float(n) => Ok(n.trunc() as i32),
            _ => Err(MuError::from(Diagnostic::runtime(format!(
                "expected num exit status, found {}",
                value.type_name()
            )))),
        }
    }
}

enum FlowControl {
    Next,
    Values(Vec<Value>),
    Return(Value),
}

fn literal(literal: &Literal) -> Value {
    match literal {
        Literal::Int(n) => Value::int(*n),
        Literal::Float(n) => Value::float(*n),
        Literal::Bool(b) => Value::bool(*b),
        Literal::String(s) => Value::string(s.clone()),
        Literal::Nil => Value::nil(),
    }
}

fn runtime_error(message: impl Into<String>, span: SourceSpan) -> MuError {
    MuError::from(Diagnostic::runtime(message).with_span(span))
}

fn binary(op: BinaryOp, left: &Value, right: &Value, span: SourceSpan) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Equal => Ok(Value::bool(equal(left, right))),
        NotEqual => Ok(Value::bool(!equal(left, right))),
        Add => match (left.kind(), right.kind()) {
            (ValueKind::String(a), _) => Ok(Value::string(format!("{a}{right}"))),
            (_, ValueKind::String(b)) => Ok(Value::string(format!("{left}{b}"))),
            _ => arithmetic(op, left, right, span),
        },
        Sub | Mul | Div | Mod => arithmetic(op, left, right, span),
        Less | LessEqual | Greater | GreaterEqual => {
            let ordering = match (left.kind(), right.kind()) {
                (ValueKind::String(a), ValueKind::String(b)) => a.partial_cmp(b),
                _ => number(left, span)?.partial_cmp(&number(right, span)?),
            };
            let Some(ordering) = ordering else {
                return Ok(Value::bool(false));
            };
            Ok(Value::bool(match op {
                Less => ordering.is_lt(),
                LessEqual => ordering.is_le(),
                Greater => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value, span: SourceSpan) -> Result<Value> {
    if let (ValueKind::Int(a), ValueKind::Int(b)) = (left.kind(), right.kind()) {
        let (a, b) = (*a, *b);
        if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == 0 {
            return Err(runtime_error("division by zero", span));
        }
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div if a.checked_rem(b) == Some(0) => a.checked_div(b),
            BinaryOp::Mod => a.checked_rem(b),
            _ => None,
        };
        if let Some(n) = exact {
            return Ok(Value::int(n));
        }
    }
    let (a, b) = (number(left, span)?, number(right, span)?);
    Ok(Value::float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => a % b,
    }))
}

fn number(value: &Value, span: SourceSpan) -> Result<f64> {
    match value.kind() {
        ValueKind::Int(n) => Ok(*n as f64),
        ValueKind::Float(n) => Ok(*n),
        _ => Err(runtime_error(
            format!("expected num, found {}", value.type_name()),
            span,
        )),
    }
}

fn index_into(target: &Value, index: &Value, span: SourceSpan) -> Result<Value> {
    match (target.kind(), index.kind()) {
        (ValueKind::Array(values), ValueKind::Int(idx)) => Ok(usize::try_from(*idx)
            .ok()
            .and_then(|idx| values.get(idx).cloned())
            .unwrap_or_else(Value::nil)),
        (ValueKind::String(text), ValueKind::Int(idx)) => Ok(usize::try_from(*idx)
            .ok()
            .and_then(|idx| text.chars().nth(idx))
            .map(|ch| Value::string(ch.to_string()))
            .unwrap_or_else(Value::nil)),
        (ValueKind::Map(map), ValueKind::String(key)) => {
            Ok(map.get(key).cloned().unwrap_or_else(Value::nil))
        }
        _ => Err(runtime_error(
            format!(
                "cannot index {} with {}",
                target.type_name(),
                index.type_name()
            ),
            span,
        )),
    }
}

fn equal(left: &Value, right: &Value) -> bool {
    match (left.kind(), right.kind()) {
        (ValueKind::Nil, ValueKind::Nil) => true,
        (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
        (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
        (ValueKind::Int(_) | ValueKind::Float(_), ValueKind::Int(_) | ValueKind::Float(_)) => {
            matches!((as_f64(left), as_f64(right)), (Some(a), Some(b)) if a == b)
        }
        (ValueKind::String(a), ValueKind::String(b)) => a == b,
        (ValueKind::Array(a), ValueKind::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(l, r)| equal(l, r))
        }
        (ValueKind::Map(a), ValueKind::Map(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|rhs| equal(value, rhs)))
        }
        _ => Rc::ptr_eq(&left.0, &right.0),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value.kind() {
        ValueKind::Int(n) => Some(*n as f64),
        ValueKind::Float(n) => Some(*n),
        _ => None,
    }
}
