use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, MuError, SourceSpan},
    value::Value,
};

pub type EnvironmentRef = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    parent: Option<EnvironmentRef>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new() -> EnvironmentRef {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn with_parent(parent: EnvironmentRef) -> EnvironmentRef {
        Rc::new(RefCell::new(Self {
            parent: Some(parent),
            bindings: IndexMap::new(),
        }))
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(env: &EnvironmentRef, name: &str) -> Option<Value> {
        let scope = env.borrow();
        match scope.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => scope
                .parent
                .as_ref()
                .and_then(|parent| Environment::lookup(parent, name)),
        }
    }

    pub fn get(env: &EnvironmentRef, name: &str, span: SourceSpan) -> Result<Value, MuError> {
        Environment::lookup(env, name).ok_or_else(|| {
            MuError::from(
                Diagnostic::runtime(format!("undefined variable `{name}`")).with_span(span),
            )
        })
    }

    pub fn assign(
        env: &EnvironmentRef,
        name: &str,
        value: Value,
        span: SourceSpan,
    ) -> Result<(), MuError> {
        let parent = {
            let mut scope = env.borrow_mut();
            if let Some(slot) = scope.bindings.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            scope.parent.clone()
        };
        match parent {
            Some(parent) => Environment::assign(&parent, name, value, span),
            None => Err(MuError::from(
                Diagnostic::runtime(format!("undefined variable `{name}`")).with_span(span),
            )),
        }
    }
}

/// The live binding environment shared by everything a driver loads.
///
/// Cloning a `Scope` yields another handle onto the same bindings.
#[derive(Clone)]
pub struct Scope {
    root: EnvironmentRef,
}

impl Scope {
    /// Creates a scope whose bindings start as a copy of `builtins`.
    pub fn extend(builtins: &IndexMap<String, Value>) -> Self {
        let root = Environment::new();
        {
            let mut env = root.borrow_mut();
            for (name, value) in builtins {
                env.define(name.clone(), value.clone());
            }
        }
        Self { root }
    }

    pub fn env(&self) -> &EnvironmentRef {
        &self.root
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        Environment::lookup(&self.root, name)
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.root.borrow_mut().define(name, value);
    }

    pub fn len(&self) -> usize {
        self.root.borrow().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
