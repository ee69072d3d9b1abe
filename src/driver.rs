use std::io::{Read, Write};

use tracing::{debug, info};

use crate::{
    args::ArgCursor,
    config::Config,
    diagnostics::MuError,
    engine::{Engine, EvalMode},
    options::{self, Action},
    repl::LineReader,
};

/// Exit status reported for a malformed command line.
pub const USAGE_STATUS: i32 = -1;

/// Everything one interpreter run shares: the engine, the single scope all
/// source is loaded into, presentation settings and the output stream.
pub struct Driver<E: Engine, W: Write> {
    pub(crate) engine: E,
    pub(crate) scope: E::Scope,
    pub(crate) config: Config,
    pub(crate) out: W,
}

impl<E: Engine, W: Write> Driver<E, W> {
    pub fn new(engine: E, config: Config, out: W) -> Self {
        let scope = engine.scope();
        Self {
            engine,
            scope,
            config,
            out,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn scope(&self) -> &E::Scope {
        &self.scope
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs the full command line: options, scheduled actions, the program
    /// load and finally either the REPL or the program's `main`.
    ///
    /// Errors from `main` are returned rather than reported.
    pub fn main<I, S, R, F>(
        &mut self,
        argv: I,
        stdin: &mut dyn Read,
        open_reader: F,
    ) -> Result<i32, MuError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: LineReader,
        F: FnOnce() -> Result<R, MuError>,
    {
        let mut cursor = ArgCursor::new(argv);
        let program_name = cursor.peek().unwrap_or("mu").to_string();
        let options = match options::parse(&mut cursor) {
            Ok(options) => options,
            Err(err) => {
                debug!(error = %err, "rejecting command line");
                write!(self.out, "{}", options::usage(&program_name)).ok();
                self.out.flush().ok();
                return Ok(USAGE_STATUS);
            }
        };

        for action in &options.actions {
            debug!(?action, "running scheduled action");
            match action {
                Action::Execute(source) => self.execute(source),
                Action::Load(path) => {
                    self.load_file(path);
                }
            }
        }

        let mut mode = options.mode;
        if mode.load_requested || !cursor.is_exhausted() {
            match cursor.advance().map(str::to_string) {
                Some(path) => {
                    self.load_file(&path);
                }
                None => {
                    self.load_stream(stdin);
                }
            }
            mode.load_requested = true;
        }

        let arguments = self.collect_arguments(cursor.remaining());

        if mode.interactive || (!mode.load_requested && !mode.executed_any) {
            info!("entering interactive mode");
            let mut reader = open_reader()?;
            self.interpret(&mut reader)
        } else {
            self.run(&arguments)
        }
    }

    /// Evaluates `source` as statements; errors are reported, not returned.
    pub fn execute(&mut self, source: &str) {
        self.protect(|driver| {
            driver
                .engine
                .evaluate(source.as_bytes(), &mut driver.scope, EvalMode::Statements)
        });
    }

    /// Builds the entry point's argument list from leftover command-line
    /// tokens.
    pub fn collect_arguments(&self, rest: &[String]) -> E::Value {
        let items = rest.iter().map(|arg| self.engine.text(arg)).collect();
        self.engine.list(items)
    }

    /// Runs one top-level unit of work. An interpreter error abandons the
    /// unit, is printed as a single line, and yields `None`.
    pub fn protect<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T, MuError>) -> Option<T> {
        match op(self) {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    pub fn report(&mut self, err: &MuError) {
        debug!(error = %err, "operation abandoned");
        let line = self.config.error_line(&err.message());
        writeln!(self.out, "{line}").ok();
    }

    pub fn flush(&mut self) {
        self.out.flush().ok();
    }
}
