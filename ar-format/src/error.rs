use std::fmt;
use std::io;
use std::sync::Arc;

use crate::header::Field;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while encoding, reading or writing an `ar` archive.
///
/// Readers and writers hold on to a fatal error and hand out clones of it on
/// every later call, so this type is `Clone` and keeps I/O errors behind an `Arc`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("not an ar archive: missing `!<arch>` preamble")]
    InvalidFormat,

    #[error("invalid ar header: {0}")]
    InvalidHeader(#[from] HeaderError),

    #[error("{field} field is {len} bytes long, column width is {max}")]
    FieldTooLong {
        field: Field,
        len: usize,
        max: usize,
    },

    #[error("invalid entry name `{0}`")]
    InvalidName(String),

    #[error("unexpected end of stream, {remaining} bytes missing")]
    UnexpectedEof { remaining: u64 },

    #[error("archive has already been closed")]
    WriteAfterClose,

    #[error("missed writing {remaining} bytes of the previous entry")]
    MissedBytes { remaining: u64 },

    #[error("write of {len} bytes exceeds the {remaining} bytes left in the entry")]
    WriteTooLong { len: usize, remaining: u64 },

    #[error(transparent)]
    Io(Arc<io::Error>),
}

/// The reasons a 60-byte header block can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("bad terminator {}", Terminator(.0))]
    BadTerminator([u8; 2]),

    #[error("cannot parse {field} field `{value}`")]
    InvalidField { field: Field, value: String },

    #[error("{field} field is out of range")]
    Overflow { field: Field },

    #[error("entry name is not valid UTF-8")]
    InvalidUtf8,

    #[error("zero block followed by a non-zero block")]
    TrailingBlock,
}

struct Terminator<'a>(&'a [u8; 2]);

impl fmt::Display for Terminator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x} {:#04x}", self.0[0], self.0[1])
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Errors that went out through a `Read`/`Write` impl come back unwrapped.
        match err.get_ref().and_then(|inner| inner.downcast_ref::<Error>()) {
            Some(inner) => inner.clone(),
            None => Error::Io(Arc::new(err)),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        use io::ErrorKind;

        let kind = match &err {
            Error::Io(inner) => inner.kind(),
            Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Error::InvalidFormat | Error::InvalidHeader(_) => ErrorKind::InvalidData,
            Error::FieldTooLong { .. } | Error::InvalidName(_) | Error::WriteTooLong { .. } => {
                ErrorKind::InvalidInput
            }
            Error::WriteAfterClose | Error::MissedBytes { .. } => ErrorKind::Other,
        };

        io::Error::new(kind, err)
    }
}
