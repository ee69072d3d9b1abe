use std::io::Write;

use tracing::debug;

use crate::{diagnostics::MuError, driver::Driver, engine::Engine};

/// Name of the function a batch run calls once loading is done.
pub const ENTRY_POINT: &str = "main";

impl<E: Engine, W: Write> Driver<E, W> {
    /// Calls the program's entry point with `arguments` and returns its
    /// result as an exit status. No entry point means success.
    ///
    /// Errors are not trapped here; a failing batch run fails the process.
    pub fn run(&mut self, arguments: &E::Value) -> Result<i32, MuError> {
        let entry = match self.engine.lookup(&self.scope, ENTRY_POINT) {
            Some(entry) if self.engine.is_callable(&entry) => entry,
            _ => {
                debug!("no callable `{ENTRY_POINT}`, nothing to run");
                return Ok(0);
            }
        };
        let result = self.engine.call(&entry, arguments.clone())?;
        let status = self.engine.exit_code(&result)?;
        debug!(status, "entry point returned");
        Ok(status)
    }
}
