//! Streaming reader and writer for the Unix `ar` archive format, the container
//! used by `.deb` packages.
//!
//! Use [ArReader][ArReader] to walk the entries of an archive, and
//! [ArWriter][ArWriter] to produce one. Both work one entry at a time over any
//! `Read` or `Write` and never buffer payload data.
//!
//! Only the common fixed-width header layout is supported: entry names are at
//! most 16 bytes and every entry is a regular file. GNU and BSD extended names
//! and symbol tables are not handled.

#[cfg(feature = "writer")]
mod archivable;
mod error;
mod fs;
pub mod header;
#[cfg(feature = "reader")]
mod reader;
#[cfg(feature = "writer")]
mod writer;

#[cfg(feature = "writer")]
pub use archivable::{build_archive, create_archive, Archivable, BytesArchivable, FileArchivable};
pub use error::{Error, HeaderError, Result};
pub use header::{Field, Header};
#[cfg(feature = "reader")]
pub use reader::ArReader;
#[cfg(feature = "writer")]
pub use writer::ArWriter;
