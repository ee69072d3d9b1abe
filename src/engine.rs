//! The narrow surface through which the driver talks to a language engine.
//!
//! The driver never looks inside values or scopes; it only evaluates source,
//! looks names up, calls functions and asks for display text.

use crate::diagnostics::MuError;

/// Selects whether an evaluation reports the value of its trailing
/// expression statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Execute statements only; the result is always the engine's nil.
    Statements,
    /// Execute statements and capture the trailing expression value(s).
    Capture,
}

pub trait Engine {
    type Value: Clone;
    type Scope;

    /// A fresh scope seeded from the engine's builtin registry.
    fn scope(&self) -> Self::Scope;

    fn evaluate(
        &mut self,
        source: &[u8],
        scope: &mut Self::Scope,
        mode: EvalMode,
    ) -> Result<Self::Value, MuError>;

    fn lookup(&self, scope: &Self::Scope, name: &str) -> Option<Self::Value>;

    fn is_callable(&self, value: &Self::Value) -> bool;

    /// Calls `function` with `argument` as its single parameter.
    fn call(
        &mut self,
        function: &Self::Value,
        argument: Self::Value,
    ) -> Result<Self::Value, MuError>;

    /// Display text for `value`, enclosed in delimiters.
    fn represent(&self, value: &Self::Value, depth: usize) -> Result<String, MuError>;

    fn text(&self, text: &str) -> Self::Value;

    fn list(&self, items: Vec<Self::Value>) -> Self::Value;

    /// Converts an entry point's result into a process exit status.
    fn exit_code(&self, value: &Self::Value) -> Result<i32, MuError>;
}
