use std::io::{self, Write};

use crate::cli::ListArgs;
use crate::error::{Error, Result};
use crate::util::{format_mode, format_size, format_time};

const RULE: &str = "---------  ------------  -------------  ---------------------  --------";

pub fn run(args: ListArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    list(&args, &mut out)?;
    out.flush().map_err(Error::Output)
}

fn list<W: Write>(args: &ListArgs, out: &mut W) -> Result<()> {
    let mut reader = super::open_archive(&args.archive)?;

    writeln!(
        out,
        "Mode       UID/GID       Length         Modified               Name"
    )
    .map_err(Error::Output)?;
    writeln!(out, "{}", RULE).map_err(Error::Output)?;

    let mut count = 0usize;
    let mut total = 0u64;

    while let Some(header) = reader.next().map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })? {
        let owner = format!("{}/{}", header.uid, header.gid);
        writeln!(
            out,
            "{}  {:<12}  {:>13}  {:<21}  {}",
            format_mode(header.mode),
            owner,
            format_size(header.size),
            format_time(header.modified()),
            header.name,
        )
        .map_err(Error::Output)?;

        count += 1;
        total += header.size;
    }

    writeln!(out, "{}", RULE).map_err(Error::Output)?;
    writeln!(
        out,
        "{:9}  {:12}  {:>13}  {:21}  {} entries",
        "",
        "",
        format_size(total),
        "",
        count
    )
    .map_err(Error::Output)
}
