pub mod create;
pub mod extract;
pub mod list;
pub mod print;

pub use create::run as create;
pub use extract::run as extract;
pub use list::run as list;
pub use print::run as print;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ar_format::ArReader;

use crate::error::{Error, Result};

pub(crate) fn open_archive(path: &Path) -> Result<ArReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::OpenArchive {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    ArReader::new_seekable(BufReader::new(file)).map_err(|source| Error::OpenArchive {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `name` was selected on the command line; an empty selection selects everything.
pub(crate) fn is_selected(names: &[String], name: &str) -> bool {
    names.is_empty() || names.iter().any(|n| n == name)
}
