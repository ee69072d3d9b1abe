//! Stand-alone driver for the Mu scripting language: command-line option
//! handling, program loading, the interactive loop and the batch entry
//! point, together with the compact interpreter it drives.

pub mod args;
pub mod ast;
pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod engine;
pub mod environment;
pub mod lexer;
pub mod loader;
pub mod logging;
pub mod options;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod runtime;
pub mod stdlib;
pub mod sys;
pub mod value;

pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticKind, MuError, SourceSpan};
pub use driver::Driver;
pub use engine::{Engine, EvalMode};
pub use repl::LineReader;
pub use runtime::{Host, Interpreter};
pub use sys::SystemHost;
