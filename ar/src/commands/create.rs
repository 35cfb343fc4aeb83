use std::path::Path;

use ar_format::{Archivable, FileArchivable};

use crate::cli::CreateArgs;
use crate::error::{Error, Result};

pub fn run(args: CreateArgs, verbose: bool) -> Result<()> {
    if args.archive.exists() && !args.force {
        return Err(Error::ArchiveExists { path: args.archive });
    }

    let archive = args
        .archive
        .canonicalize()
        .unwrap_or_else(|_| args.archive.clone());

    let mut items = Vec::with_capacity(args.files.len());
    for file in args.files.iter() {
        if same_file(&archive, file) {
            return Err(Error::ArchiveSelf { path: file.clone() });
        }

        let name = match file.file_name().and_then(|x| x.to_str()) {
            Some(name) => name.to_string(),
            None => return Err(Error::InvalidName { path: file.clone() }),
        };

        if verbose {
            println!("{}", name);
        }
        items.push(FileArchivable::new(file, name));
    }

    let refs = items.iter().map(|x| x as &dyn Archivable).collect::<Vec<_>>();
    ar_format::create_archive(&args.archive, &refs).map_err(|source| Error::CreateArchive {
        path: args.archive.clone(),
        source,
    })?;

    tracing::debug!(path = %args.archive.display(), entries = items.len(), "archive written");
    Ok(())
}

fn same_file(archive: &Path, file: &Path) -> bool {
    match file.canonicalize() {
        Ok(file) => file == archive,
        Err(_) => false,
    }
}
