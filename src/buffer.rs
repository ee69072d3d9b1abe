use std::io::{self, ErrorKind, Read};

pub const BLOCK_SIZE: usize = 512;

/// Append-only byte buffer that grows one fixed-size block at a time.
///
/// `capacity` counts the bytes made available by [`FileBuffer::grow`];
/// `len` counts the bytes actually filled and never exceeds it.
#[derive(Debug)]
pub struct FileBuffer {
    data: Vec<u8>,
    len: usize,
    block_size: usize,
}

impl FileBuffer {
    pub fn new() -> Self {
        Self::with_block_size(BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            data: Vec::new(),
            len: 0,
            block_size: block_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Makes one more block of space available after the filled bytes.
    pub fn grow(&mut self) {
        let target = self.len + self.block_size;
        if self.data.len() < target {
            self.data.resize(target, 0);
        }
    }

    /// Reads into the unfilled tail until it is full or `reader` reaches end
    /// of stream. Returns the number of bytes added.
    pub fn fill_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<usize> {
        let start = self.len;
        while self.len < self.data.len() {
            match reader.read(&mut self.data[self.len..]) {
                Ok(0) => break,
                Ok(read) => self.len += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(self.len - start)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl Default for FileBuffer {
    fn default() -> Self {
        Self::new()
    }
}
