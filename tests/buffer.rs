use std::io::{self, Read};

use mu::{
    buffer::{FileBuffer, BLOCK_SIZE},
    loader::read_stream,
};
use proptest::prelude::*;

/// Serves `data` in the given chunk sizes, cycling through them.
struct Chunked {
    data: Vec<u8>,
    position: usize,
    chunks: Vec<usize>,
    turn: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.chunks[self.turn % self.chunks.len()];
        self.turn += 1;
        let count = buf.len().min(chunk).min(self.data.len() - self.position);
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

#[test]
fn default_buffer_is_empty_with_standard_block() {
    let buffer = FileBuffer::default();
    assert_eq!(buffer.block_size(), BLOCK_SIZE);
    assert_eq!(buffer.len(), 0);
    assert!(buffer.as_bytes().is_empty());
    assert_eq!(FileBuffer::with_block_size(0).block_size(), 1);
}

#[test]
fn grow_adds_exactly_one_block() {
    let mut buffer = FileBuffer::with_block_size(8);
    assert_eq!(buffer.capacity(), 0);
    assert!(buffer.is_empty());
    buffer.grow();
    assert_eq!(buffer.capacity(), 8);
    let read = buffer.fill_from(&mut &b"abc"[..]).expect("reads");
    assert_eq!(read, 3);
    assert_eq!(buffer.as_bytes(), b"abc");
    buffer.grow();
    assert_eq!(buffer.capacity(), 11);
}

#[test]
fn interrupted_reads_are_retried() {
    struct Flaky {
        interrupted: bool,
    }
    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            buf[0] = b'x';
            Ok(1)
        }
    }

    let mut buffer = FileBuffer::with_block_size(4);
    buffer.grow();
    let read = buffer
        .fill_from(&mut Flaky { interrupted: false })
        .expect("retries");
    assert_eq!(read, 4);
    assert_eq!(buffer.as_bytes(), b"xxxx");
}

#[test]
fn empty_stream_yields_empty_buffer() {
    let buffer = read_stream(&mut io::empty(), 512).expect("reads");
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 512);
}

proptest! {
    #[test]
    fn buffered_bytes_match_stream(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
        chunks in proptest::collection::vec(1usize..300, 1..5),
        block in 1usize..200,
    ) {
        let mut reader = Chunked { data: data.clone(), position: 0, chunks, turn: 0 };
        let buffer = read_stream(&mut reader, block).expect("reads");
        prop_assert!(buffer.len() <= buffer.capacity());
        prop_assert!(buffer.capacity() - buffer.len() <= block);
        prop_assert_eq!(buffer.capacity() % block, 0);
        prop_assert_eq!(buffer.as_bytes(), data.as_slice());
    }
}
