use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open archive `{}`", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: ar_format::Error,
    },

    #[error("Cannot read archive `{}`", .path.display())]
    ReadArchive {
        path: PathBuf,
        #[source]
        source: ar_format::Error,
    },

    #[error("Cannot create archive `{}`", .path.display())]
    CreateArchive {
        path: PathBuf,
        #[source]
        source: ar_format::Error,
    },

    #[error("Archive already exists: `{}` (use -f/--force to overwrite)", .path.display())]
    ArchiveExists { path: PathBuf },

    #[error("Cowardly refusing to archive `{}` into itself", .path.display())]
    ArchiveSelf { path: PathBuf },

    #[error("Cannot use `{}` as an entry name", .path.display())]
    InvalidName { path: PathBuf },

    #[error("Refusing to extract unsafe entry name `{name}`")]
    UnsafeName { name: String },

    #[error("Cannot create directory `{}`", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot extract `{name}` to `{}`", .path.display())]
    Extract {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write to standard output")]
    Output(#[source] std::io::Error),

    #[error("Cannot write `{name}` to standard output")]
    Print {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
