use std::io::{self, Write};

use crate::cli::PrintArgs;
use crate::error::{Error, Result};

pub fn run(args: PrintArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print(&args, &mut out)?;
    out.flush().map_err(Error::Output)
}

fn print<W: Write>(args: &PrintArgs, out: &mut W) -> Result<()> {
    let mut reader = super::open_archive(&args.archive)?;

    while let Some(header) = reader.next().map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })? {
        if !super::is_selected(&args.names, &header.name) {
            continue;
        }

        io::copy(&mut reader, out).map_err(|source| Error::Print {
            name: header.name.clone(),
            source,
        })?;
    }

    Ok(())
}
