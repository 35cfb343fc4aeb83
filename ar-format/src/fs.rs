//! Filesystem utilities for deriving entry headers from file metadata.

use std::fs::Metadata;

use crate::header::Header;

impl Header {
    /// Builds a header for a regular file from its metadata.
    ///
    /// On Unix: mtime, mode, uid, gid
    /// Elsewhere: mtime, and a mode of `0o644` (`0o444` if read-only)
    pub fn from_metadata<S: Into<String>>(name: S, meta: &Metadata) -> Header {
        let (uid, gid, mode) = ownership(meta);

        let mut header = Header {
            name: name.into(),
            uid,
            gid,
            mode,
            size: meta.len(),
            ..Default::default()
        };

        if let Ok(modified) = meta.modified() {
            header.set_modified(modified);
        }

        header
    }
}

#[cfg(unix)]
fn ownership(meta: &Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt;

    (meta.uid(), meta.gid(), meta.mode() & 0o7777)
}

#[cfg(not(unix))]
fn ownership(meta: &Metadata) -> (u32, u32, u32) {
    let mode = if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    };

    (0, 0, mode)
}
