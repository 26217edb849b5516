//! Validation drain for signed containers.
//!
//! The container format itself lives elsewhere; a reader for it is expected
//! to check per-entry digests while entries are streamed out and to check
//! the container signature no later than `close`. Draining every entry into
//! a discarding sink and then closing is therefore a full validation.

use std::io::{self, Write};

use crate::infra::error::AsicResult;

/// Sequential access to the entries of a signed container.
pub trait ContainerReader {
    /// Advance to the next entry, returning its name, or `None` at the end.
    fn next_entry(&mut self) -> AsicResult<Option<String>>;

    /// Stream the current entry's bytes into `sink`.
    fn write_entry(&mut self, sink: &mut dyn Write) -> AsicResult<()>;

    /// Finish reading. Validation errors not reported earlier must surface here.
    fn close(&mut self) -> AsicResult<()>;
}

impl<R: ContainerReader + ?Sized> ContainerReader for &mut R {
    fn next_entry(&mut self) -> AsicResult<Option<String>> {
        (**self).next_entry()
    }

    fn write_entry(&mut self, sink: &mut dyn Write) -> AsicResult<()> {
        (**self).write_entry(sink)
    }

    fn close(&mut self) -> AsicResult<()> {
        (**self).close()
    }
}

/// What a successful drain went through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub entries: usize,
    pub bytes: u64,
}

/// Discards everything written to it, counting bytes.
#[derive(Debug, Default)]
struct CountingSink {
    bytes: u64,
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Forces full validation of a container by reading it to the end.
pub struct ValidationDrain;

impl ValidationDrain {
    /// Drain every entry of `reader`, then close it.
    ///
    /// The first error from any step is returned unchanged and the reader is
    /// dropped without being closed.
    pub fn run<R: ContainerReader>(mut reader: R) -> AsicResult<DrainSummary> {
        let mut sink = CountingSink::default();
        let mut entries = 0;

        while let Some(name) = reader.next_entry()? {
            log::debug!("Draining container entry '{name}'");
            reader.write_entry(&mut sink)?;
            entries += 1;
        }
        reader.close()?;

        log::info!(
            "Container validated: {entries} entries, {} bytes",
            sink.bytes
        );
        Ok(DrainSummary {
            entries,
            bytes: sink.bytes,
        })
    }
}
