use std::io::{self, Write};

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    diagnostics::MuError,
    driver::Driver,
    engine::{Engine, EvalMode},
};

/// Depth passed to the engine when echoing a captured result.
const ECHO_DEPTH: usize = 2;

/// Source of interactive input lines.
pub trait LineReader {
    /// Shows `prompt` and blocks for one line; `None` means end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MuError>;

    fn add_history(&mut self, line: &str);
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, MuError> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(MuError::from(io::Error::new(io::ErrorKind::Other, err))),
        }
    }

    fn add_history(&mut self, line: &str) {
        self.add_history_entry(line).ok();
    }
}

pub fn editor() -> Result<DefaultEditor, MuError> {
    DefaultEditor::new().map_err(|err| MuError::from(io::Error::new(io::ErrorKind::Other, err)))
}

impl<E: Engine, W: Write> Driver<E, W> {
    /// Reads, evaluates and echoes lines until `reader` runs dry. A failing
    /// line is reported and the loop carries on.
    pub fn interpret<R: LineReader + ?Sized>(&mut self, reader: &mut R) -> Result<i32, MuError> {
        let prompt = self.config.prompt_text();
        while let Some(line) = reader.read_line(&prompt)? {
            if !line.trim().is_empty() {
                reader.add_history(&line);
            }
            if let Some(text) = self.protect(|driver| driver.echo(&line)) {
                writeln!(self.out, "{text}").ok();
                self.out.flush().ok();
            }
        }
        Ok(0)
    }

    fn echo(&mut self, line: &str) -> Result<String, MuError> {
        let value = self
            .engine
            .evaluate(line.as_bytes(), &mut self.scope, EvalMode::Capture)?;
        let repr = self.engine.represent(&value, ECHO_DEPTH)?;
        Ok(strip_delimiters(&repr).to_string())
    }
}

/// Drops the first and last character of a representation.
pub fn strip_delimiters(repr: &str) -> &str {
    let mut chars = repr.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}
