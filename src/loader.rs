use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use tracing::debug;

use crate::{
    buffer::FileBuffer,
    diagnostics::{Diagnostic, MuError},
    driver::Driver,
    engine::{Engine, EvalMode},
};

/// Buffers `reader` to end of stream, one block at a time.
pub fn read_stream<R: Read + ?Sized>(
    reader: &mut R,
    block_size: usize,
) -> Result<FileBuffer, MuError> {
    let mut buffer = FileBuffer::with_block_size(block_size);
    loop {
        buffer.grow();
        let read = buffer
            .fill_from(reader)
            .map_err(|err| Diagnostic::io("io error reading file", &err))?;
        if read < buffer.block_size() {
            break;
        }
    }
    Ok(buffer)
}

impl<E: Engine, W: Write> Driver<E, W> {
    /// Loads and evaluates everything `reader` yields. Returns whether the
    /// load completed without an error.
    pub fn load_stream<R: Read + ?Sized>(&mut self, reader: &mut R) -> bool {
        self.protect(|driver| driver.evaluate_stream(reader))
            .is_some()
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.protect(|driver| {
            debug!(path = %path.display(), "loading file");
            let mut file =
                File::open(path).map_err(|err| Diagnostic::io("io error opening file", &err))?;
            driver.evaluate_stream(&mut file)
        })
        .is_some()
    }

    fn evaluate_stream<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<(), MuError> {
        let buffer = read_stream(reader, self.config.block_size)?;
        debug!(
            bytes = buffer.len(),
            capacity = buffer.capacity(),
            "buffered program source"
        );
        self.engine
            .evaluate(buffer.as_bytes(), &mut self.scope, EvalMode::Statements)?;
        Ok(())
    }
}
