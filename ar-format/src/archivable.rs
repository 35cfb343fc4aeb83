//! Payload sources and helpers that write a whole archive in one go.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::header::Header;
use crate::writer::ArWriter;

/// Something that can become one archive entry.
pub trait Archivable {
    /// The entry header, with `size` matching what [`reader`](Archivable::reader) yields.
    fn header(&self) -> io::Result<Header>;

    /// A stream over the entry payload.
    fn reader(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// A file on disk, stored under a different name in the archive.
#[derive(Debug, Clone)]
pub struct FileArchivable {
    pub path: PathBuf,
    pub archive_name: String,
}

impl FileArchivable {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, archive_name: S) -> FileArchivable {
        FileArchivable {
            path: path.into(),
            archive_name: archive_name.into(),
        }
    }
}

impl Archivable for FileArchivable {
    fn header(&self) -> io::Result<Header> {
        let meta = std::fs::metadata(&self.path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{}` is not a regular file", self.path.display()),
            ));
        }

        Ok(Header::from_metadata(self.archive_name.clone(), &meta))
    }

    fn reader(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// In-memory payload with a caller supplied header.
#[derive(Debug, Clone)]
pub struct BytesArchivable<'a> {
    header: Header,
    data: Cow<'a, [u8]>,
}

impl<'a> BytesArchivable<'a> {
    /// The header's `size` is replaced with the length of `data`.
    pub fn new<D: Into<Cow<'a, [u8]>>>(mut header: Header, data: D) -> BytesArchivable<'a> {
        let data = data.into();
        header.size = data.len() as u64;
        BytesArchivable { header, data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Archivable for BytesArchivable<'_> {
    fn header(&self) -> io::Result<Header> {
        Ok(self.header.clone())
    }

    fn reader(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(&*self.data)))
    }
}

/// Writes `items` as a complete archive to `writer` and hands it back.
pub fn build_archive<W: Write>(writer: W, items: &[&dyn Archivable]) -> Result<W> {
    let mut archive = ArWriter::new(writer);

    for item in items {
        let header = item.header()?;
        archive.write_header(&header)?;

        let mut reader = item.reader()?;
        let copied = io::copy(&mut reader, &mut archive)?;
        tracing::debug!(name = %header.name, bytes = copied, "archived entry");
    }

    archive.close()?;
    Ok(archive.into_inner())
}

/// Creates the file at `path`, replacing any existing one, and writes `items` to it.
pub fn create_archive<P: AsRef<Path>>(path: P, items: &[&dyn Archivable]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut out = build_archive(BufWriter::new(file), items)?;
    out.flush()?;

    tracing::debug!(path = %path.as_ref().display(), entries = items.len(), "created ar archive");
    Ok(())
}
