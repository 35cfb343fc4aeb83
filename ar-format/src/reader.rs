use std::convert::TryFrom;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{Error, HeaderError, Result};
use crate::header::{Header, HEADER_SIZE, MAGIC};

const ZERO_BLOCK: [u8; HEADER_SIZE] = [0; HEADER_SIZE];

type SkipFn<R> = fn(&mut R, u64) -> io::Result<u64>;

enum State {
    Open,
    Ended,
    Failed(Error),
}

/// Sequential reader over an `ar` archive.
///
/// Call [`next`](ArReader::next) to advance to an entry, then read its payload
/// through the `Read` impl, which reports end of file at the entry boundary.
pub struct ArReader<R> {
    inner: R,
    skip: SkipFn<R>,
    /// Unread payload bytes of the current entry.
    remaining: u64,
    /// The current entry is followed by an alignment byte.
    pad: bool,
    state: State,
}

impl<R> fmt::Debug for ArReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArReader")
            .field("remaining", &self.remaining)
            .field("pad", &self.pad)
            .finish_non_exhaustive()
    }
}

impl<R: Read> ArReader<R> {
    /// Checks the archive preamble. Exactly eight bytes are consumed.
    pub fn new(inner: R) -> Result<ArReader<R>> {
        ArReader::with_skip(inner, skip_by_reading)
    }

    fn with_skip(mut inner: R, skip: SkipFn<R>) -> Result<ArReader<R>> {
        let mut magic = [0u8; MAGIC.len()];
        let filled = read_full(&mut inner, &mut magic)?;

        if filled < magic.len() || &magic != MAGIC {
            tracing::debug!(bytes = filled, "missing ar preamble");
            return Err(Error::InvalidFormat);
        }

        Ok(ArReader {
            inner,
            skip,
            remaining: 0,
            pad: false,
            state: State::Open,
        })
    }

    /// Advances to the next entry, skipping whatever is left of the current one.
    ///
    /// Returns `Ok(None)` at the end of the archive. Errors are sticky: once one
    /// is returned, every later call returns it again without touching the stream.
    pub fn next(&mut self) -> Result<Option<Header>> {
        match &self.state {
            State::Open => {}
            State::Ended => return Ok(None),
            State::Failed(err) => return Err(err.clone()),
        }

        match self.advance() {
            Ok(Some(header)) => Ok(Some(header)),
            Ok(None) => {
                tracing::debug!("reached end of ar archive");
                self.state = State::Ended;
                Ok(None)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Reads exactly `len` bytes from the archive as a string, regardless of
    /// entry boundaries. Used for a known-length leading record of an entry.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        if let State::Failed(err) = &self.state {
            return Err(err.clone());
        }

        let mut buf = vec![0u8; len];
        let filled = match read_full(&mut self.inner, &mut buf) {
            Ok(filled) => filled,
            Err(err) => {
                tracing::warn!(error = %err, len, "failed to read string from entry");
                return Err(self.fail(err.into()));
            }
        };
        self.remaining = self.remaining.saturating_sub(filled as u64);

        if filled < len {
            let missing = (len - filled) as u64;
            tracing::warn!(len, missing, "entry ended before string was read");
            return Err(self.fail(Error::UnexpectedEof { remaining: missing }));
        }

        String::from_utf8(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }

    /// Payload bytes of the current entry not yet read.
    #[inline(always)]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[inline(always)]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn advance(&mut self) -> Result<Option<Header>> {
        self.skip_unread()?;
        self.read_header()
    }

    fn skip_unread(&mut self) -> Result<()> {
        let data = self.remaining;
        let count = data + u64::from(self.pad);
        self.remaining = 0;
        self.pad = false;

        if count == 0 {
            return Ok(());
        }

        let skipped = (self.skip)(&mut self.inner, count)?;
        tracing::debug!(bytes = skipped, "skipped unread entry data");

        // A missing alignment byte at the very end is left for `read_header`
        // to see as a clean end of stream.
        if skipped < data {
            return Err(Error::UnexpectedEof {
                remaining: data - skipped,
            });
        }

        Ok(())
    }

    fn read_header(&mut self) -> Result<Option<Header>> {
        let mut block = [0u8; HEADER_SIZE];

        if !self.read_block(&mut block)? {
            return Ok(None);
        }

        if block == ZERO_BLOCK {
            if !self.read_block(&mut block)? || block == ZERO_BLOCK {
                return Ok(None);
            }
            tracing::warn!("zero block followed by a non-zero block");
            return Err(HeaderError::TrailingBlock.into());
        }

        let header = Header::decode(&block).map_err(|err| {
            tracing::warn!(error = %err, "malformed ar header");
            err
        })?;

        self.remaining = header.size;
        self.pad = header.is_padded();

        tracing::debug!(name = %header.name, size = header.size, "read ar header");
        Ok(Some(header))
    }

    /// Fills `block`, returning `false` on a clean end of stream.
    fn read_block(&mut self, block: &mut [u8; HEADER_SIZE]) -> Result<bool> {
        match read_full(&mut self.inner, block)? {
            0 => Ok(false),
            HEADER_SIZE => Ok(true),
            filled => Err(Error::UnexpectedEof {
                remaining: (HEADER_SIZE - filled) as u64,
            }),
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::debug!(error = %err, "ar reader failed");
        self.state = State::Failed(err.clone());
        err
    }
}

impl<R: Read + Seek> ArReader<R> {
    /// Like [`new`](ArReader::new), but skips unread entry data by seeking.
    pub fn new_seekable(inner: R) -> Result<ArReader<R>> {
        ArReader::with_skip(inner, skip_by_seeking)
    }
}

impl<R: Read> Read for ArReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let State::Failed(err) = &self.state {
            return Err(err.clone().into());
        }

        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let limit = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));

        match self.inner.read(&mut buf[..limit]) {
            Ok(0) => {
                let err = Error::UnexpectedEof {
                    remaining: self.remaining,
                };
                Err(self.fail(err).into())
            }
            Ok(n) => {
                self.remaining -= n as u64;
                Ok(n)
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Err(err),
            Err(err) => Err(self.fail(err.into()).into()),
        }
    }
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }

    Ok(filled)
}

fn skip_by_reading<R: Read>(reader: &mut R, count: u64) -> io::Result<u64> {
    io::copy(&mut reader.by_ref().take(count), &mut io::sink())
}

fn skip_by_seeking<R: Read + Seek>(reader: &mut R, count: u64) -> io::Result<u64> {
    match seek_forward(reader, count) {
        Ok(skipped) => Ok(skipped),
        Err(err) => {
            tracing::debug!(error = %err, "seek failed, skipping by reading");
            skip_by_reading(reader, count)
        }
    }
}

// Seeking past the end succeeds silently, so the target is clamped to the
// stream length to keep truncation visible.
fn seek_forward<R: Seek>(reader: &mut R, count: u64) -> io::Result<u64> {
    let start = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    let target = start.saturating_add(count).min(end).max(start);
    reader.seek(SeekFrom::Start(target))?;

    Ok(target - start)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        for (name, data) in entries {
            let header = Header::new(*name, data.len() as u64);
            out.extend_from_slice(&header.encode().unwrap());
            out.extend_from_slice(data.as_bytes());
            if header.is_padded() {
                out.push(b'\n');
            }
        }
        out
    }

    fn read_all<R: Read>(reader: &mut ArReader<R>) -> Vec<(String, Vec<u8>)> {
        let mut out = vec![];
        while let Some(header) = reader.next().unwrap() {
            let mut data = vec![];
            reader.read_to_end(&mut data).unwrap();
            assert_eq!(data.len() as u64, header.size);
            out.push((header.name, data));
        }
        out
    }

    #[test]
    fn invalid_magic() {
        let mut cursor = Cursor::new(b"!<arch>Xmore bytes follow".to_vec());
        assert!(matches!(
            ArReader::new(&mut cursor),
            Err(Error::InvalidFormat)
        ));
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn short_magic() {
        assert!(matches!(
            ArReader::new(&b"!<ar"[..]),
            Err(Error::InvalidFormat)
        ));
    }

    #[test]
    fn empty_archive() {
        let mut reader = ArReader::new(&MAGIC[..]).unwrap();
        assert!(reader.next().unwrap().is_none());
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn reads_entries_and_skips_padding() {
        let data = archive(&[("a.txt", "xyz"), ("b.txt", "wxyz"), ("c", "")]);
        let mut reader = ArReader::new(&data[..]).unwrap();

        let entries = read_all(&mut reader);
        assert_eq!(
            entries,
            vec![
                ("a.txt".to_string(), b"xyz".to_vec()),
                ("b.txt".to_string(), b"wxyz".to_vec()),
                ("c".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn next_skips_unread_data() {
        let data = archive(&[("first", "hello world"), ("second", "abc")]);

        for seekable in &[false, true] {
            let cursor = Cursor::new(data.clone());
            let mut reader = if *seekable {
                ArReader::new_seekable(cursor).unwrap()
            } else {
                ArReader::new(cursor).unwrap()
            };

            let header = reader.next().unwrap().unwrap();
            assert_eq!(header.name, "first");
            let mut buf = [0u8; 5];
            reader.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"hello");
            assert_eq!(reader.remaining(), 6);

            let header = reader.next().unwrap().unwrap();
            assert_eq!(header.name, "second");
            assert_eq!(reader.remaining(), 3);

            let mut rest = String::new();
            reader.read_to_string(&mut rest).unwrap();
            assert_eq!(rest, "abc");
            assert!(reader.next().unwrap().is_none());
        }
    }

    #[test]
    fn read_stops_at_entry_boundary() {
        let data = archive(&[("a", "12"), ("b", "34")]);
        let mut reader = ArReader::new(Cursor::new(data)).unwrap();
        reader.next().unwrap();

        let mut buf = [0u8; 64];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        let position = reader.get_ref().position();
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.get_ref().position(), position);
    }

    #[test]
    fn truncated_payload() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&Header::new("short", 10).encode().unwrap());
        data.extend_from_slice(b"12345");

        let mut reader = ArReader::new(&data[..]).unwrap();
        reader.next().unwrap().unwrap();

        let mut buf = vec![];
        let err = reader.read_to_end(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(buf, b"12345");

        assert!(matches!(
            reader.next(),
            Err(Error::UnexpectedEof { remaining: 5 })
        ));
        assert!(reader.read(&mut [0u8; 4]).is_err());
    }

    #[test]
    fn truncated_skip() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&Header::new("short", 10).encode().unwrap());
        data.extend_from_slice(b"123");

        let mut reader = ArReader::new(&data[..]).unwrap();
        reader.next().unwrap().unwrap();
        assert!(matches!(
            reader.next(),
            Err(Error::UnexpectedEof { remaining: 7 })
        ));
    }

    #[test]
    fn truncated_seekable_skip() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&Header::new("short", 10).encode().unwrap());
        data.extend_from_slice(b"123");

        let mut reader = ArReader::new_seekable(Cursor::new(data)).unwrap();
        reader.next().unwrap().unwrap();
        assert!(matches!(
            reader.next(),
            Err(Error::UnexpectedEof { remaining: 7 })
        ));
    }

    /// Seeks relative to the current position only.
    struct ForwardOnly(Cursor<Vec<u8>>);

    impl Read for ForwardOnly {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Seek for ForwardOnly {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::End(_) => Err(io::Error::new(io::ErrorKind::Other, "no end")),
                pos => self.0.seek(pos),
            }
        }
    }

    #[test]
    fn failed_seek_falls_back_to_reading() {
        let data = archive(&[("first", "skip me"), ("second", "22")]);

        let mut reader = ArReader::new_seekable(ForwardOnly(Cursor::new(data))).unwrap();
        assert_eq!(reader.next().unwrap().unwrap().name, "first");

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.name, "second");
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "22");
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn truncated_header() {
        let mut data = archive(&[("a", "1")]);
        data.extend_from_slice(&Header::new("b", 1).encode().unwrap()[..20]);

        let mut reader = ArReader::new(&data[..]).unwrap();
        reader.next().unwrap().unwrap();
        assert!(matches!(
            reader.next(),
            Err(Error::UnexpectedEof { remaining: 40 })
        ));
    }

    #[test]
    fn missing_final_pad_is_end_of_archive() {
        let mut data = archive(&[("odd", "abc")]);
        data.pop();

        let mut reader = ArReader::new(&data[..]).unwrap();
        reader.next().unwrap().unwrap();
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn double_zero_block_ends_archive() {
        let mut data = archive(&[("a", "ab")]);
        data.extend_from_slice(&ZERO_BLOCK);
        data.extend_from_slice(&ZERO_BLOCK);
        data.extend_from_slice(b"trailing garbage");

        let mut reader = ArReader::new(&data[..]).unwrap();
        assert_eq!(reader.next().unwrap().unwrap().name, "a");
        assert!(reader.next().unwrap().is_none());
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn zero_block_then_header_is_invalid() {
        let mut data = archive(&[]);
        data.extend_from_slice(&ZERO_BLOCK);
        data.extend_from_slice(&Header::new("b", 0).encode().unwrap());

        let mut reader = ArReader::new(&data[..]).unwrap();
        assert!(matches!(
            reader.next(),
            Err(Error::InvalidHeader(HeaderError::TrailingBlock))
        ));
        // Sticky
        assert!(matches!(
            reader.next(),
            Err(Error::InvalidHeader(HeaderError::TrailingBlock))
        ));
    }

    #[test]
    fn decode_errors_are_sticky() {
        let mut data = archive(&[]);
        let mut block = Header::new("a", 0).encode().unwrap();
        block[58] = b'!';
        data.extend_from_slice(&block);
        data.extend_from_slice(&archive(&[("b", "")])[8..]);

        let mut reader = ArReader::new(Cursor::new(data)).unwrap();
        assert!(matches!(
            reader.next(),
            Err(Error::InvalidHeader(HeaderError::BadTerminator(_)))
        ));
        let position = reader.get_ref().position();
        assert!(matches!(
            reader.next(),
            Err(Error::InvalidHeader(HeaderError::BadTerminator(_)))
        ));
        assert!(reader.read_string(1).is_err());
        assert_eq!(reader.get_ref().position(), position);
    }

    #[test]
    fn read_string_consumes_entry_bytes() {
        let data = archive(&[("debian-binary", "2.0\n"), ("next", "x")]);
        let mut reader = ArReader::new(&data[..]).unwrap();

        reader.next().unwrap().unwrap();
        assert_eq!(reader.read_string(3).unwrap(), "2.0");
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.next().unwrap().unwrap().name, "next");
    }

    #[test]
    fn read_string_past_end_of_stream() {
        let data = archive(&[("a", "ab")]);
        let mut reader = ArReader::new(&data[..]).unwrap();

        reader.next().unwrap().unwrap();
        assert!(matches!(
            reader.read_string(8),
            Err(Error::UnexpectedEof { remaining: 6 })
        ));
        assert!(matches!(
            reader.next(),
            Err(Error::UnexpectedEof { remaining: 6 })
        ));
    }
}
