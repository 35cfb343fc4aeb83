use std::fmt;
use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::header::{Header, MAGIC, PAD_BYTE};

/// Sequential writer producing an `ar` archive.
///
/// Each entry is a [`write_header`](ArWriter::write_header) followed by exactly
/// `size` payload bytes through the `Write` impl. The alignment byte after an
/// odd-sized entry is emitted once its last payload byte has been written, no
/// matter how the payload was split across calls.
///
/// Nothing is written until the first header or [`close`](ArWriter::close).
pub struct ArWriter<W: Write> {
    inner: W,
    started: bool,
    /// Payload bytes still owed for the current entry.
    remaining: u64,
    /// The current entry needs an alignment byte once it is complete.
    pad: bool,
    error: Option<Error>,
    closed: Option<Result<()>>,
}

impl<W: Write> fmt::Debug for ArWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArWriter")
            .field("started", &self.started)
            .field("remaining", &self.remaining)
            .field("pad", &self.pad)
            .field("closed", &self.closed.is_some())
            .finish_non_exhaustive()
    }
}

impl<W: Write> ArWriter<W> {
    pub fn new(inner: W) -> ArWriter<W> {
        ArWriter {
            inner,
            started: false,
            remaining: 0,
            pad: false,
            error: None,
            closed: None,
        }
    }

    /// Starts a new entry.
    ///
    /// Fails with [`Error::MissedBytes`] if the previous entry did not receive
    /// all of its payload. An unencodable header fails this call only and
    /// writes nothing.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.check_open()?;
        self.finish_entry()?;

        let block = header.encode()?;

        self.write_magic()?;
        self.write_inner(&block)?;

        self.remaining = header.size;
        self.pad = header.is_padded();

        tracing::debug!(name = %header.name, size = header.size, "wrote ar header");
        Ok(())
    }

    /// Finishes the archive and flushes the underlying writer.
    ///
    /// An archive with no entries still gets its preamble. Calling this again
    /// returns the first call's result without writing anything.
    pub fn close(&mut self) -> Result<()> {
        if let Some(result) = &self.closed {
            return result.clone();
        }

        let result = self.close_inner();
        self.closed = Some(result.clone());
        result
    }

    #[inline(always)]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn close_inner(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        self.finish_entry()?;
        self.write_magic()?;
        if let Err(err) = self.inner.flush() {
            return Err(self.fail(err.into()));
        }

        tracing::debug!("closed ar archive");
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.is_some() {
            return Err(Error::WriteAfterClose);
        }

        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn finish_entry(&mut self) -> Result<()> {
        if self.remaining > 0 {
            let err = Error::MissedBytes {
                remaining: self.remaining,
            };
            return Err(self.fail(err));
        }

        Ok(())
    }

    fn write_magic(&mut self) -> Result<()> {
        if !self.started {
            self.write_inner(MAGIC)?;
            self.started = true;
        }

        Ok(())
    }

    fn write_inner(&mut self, bytes: &[u8]) -> Result<()> {
        match self.inner.write_all(bytes) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::debug!(error = %err, "ar writer failed");
        self.error = Some(err.clone());
        err
    }
}

impl<W: Write> Write for ArWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;

        if buf.is_empty() {
            return Ok(0);
        }

        if buf.len() as u64 > self.remaining {
            return Err(Error::WriteTooLong {
                len: buf.len(),
                remaining: self.remaining,
            }
            .into());
        }

        let written = match self.inner.write(buf) {
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => return Err(err),
            Err(err) => return Err(self.fail(err.into()).into()),
        };
        self.remaining -= written as u64;

        if self.remaining == 0 && self.pad {
            self.pad = false;
            self.write_inner(&[PAD_BYTE])?;
        }

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
