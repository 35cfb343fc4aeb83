use std::time::SystemTime;

macro_rules! add {
    ($ident:ident, $value:tt => $s:ident) => {
        if $ident {
            $s.push($value);
        } else {
            $s.push('-');
        }
    };
}

/// Renders permission bits as `rwxr-xr-x`.
pub fn format_mode(mode: u32) -> String {
    let or = (mode & 0o400) > 0;
    let ow = (mode & 0o200) > 0;
    let ox = (mode & 0o100) > 0;
    let gr = (mode & 0o040) > 0;
    let gw = (mode & 0o020) > 0;
    let gx = (mode & 0o010) > 0;
    let ar = (mode & 0o004) > 0;
    let aw = (mode & 0o002) > 0;
    let ax = (mode & 0o001) > 0;

    let mut s = String::new();
    add!(or, 'r' => s);
    add!(ow, 'w' => s);
    add!(ox, 'x' => s);
    add!(gr, 'r' => s);
    add!(gw, 'w' => s);
    add!(gx, 'x' => s);
    add!(ar, 'r' => s);
    add!(aw, 'w' => s);
    add!(ax, 'x' => s);

    s
}

#[inline(always)]
pub fn format_time(time: SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[inline(always)]
pub fn format_size(bytes: u64) -> String {
    use humansize::{file_size_opts as options, FileSize};

    bytes
        .file_size(options::BINARY)
        .unwrap_or_else(|_| bytes.to_string())
}

/// Accepts only entry names that stay inside the output directory as a single file.
pub fn is_safe_name(name: &str) -> bool {
    !(name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.contains(':'))
}
