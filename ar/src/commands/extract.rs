use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ar_format::Header;

use crate::cli::ExtractArgs;
use crate::error::{Error, Result};
use crate::util::is_safe_name;

pub fn run(args: ExtractArgs, verbose: bool) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output).map_err(|source| Error::CreateDirectory {
        path: output.clone(),
        source,
    })?;

    let mut reader = super::open_archive(&args.archive)?;

    while let Some(header) = reader.next().map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })? {
        if !super::is_selected(&args.names, &header.name) {
            continue;
        }

        if !is_safe_name(&header.name) {
            return Err(Error::UnsafeName { name: header.name });
        }

        let path = output.join(&header.name);
        extract_entry(&mut reader, &header, &path).map_err(|source| Error::Extract {
            name: header.name.clone(),
            path: path.clone(),
            source,
        })?;

        if verbose {
            println!("{}", header.name);
        }
        tracing::debug!(name = %header.name, path = %path.display(), "extracted entry");
    }

    Ok(())
}

fn extract_entry<R: io::Read>(reader: &mut R, header: &Header, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let copied = io::copy(reader, &mut out)?;
    out.flush()?;
    drop(out);

    if copied != header.size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, got {}", header.size, copied),
        ));
    }

    set_permissions(path, header.mode)
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if mode == 0 {
        return Ok(());
    }
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
