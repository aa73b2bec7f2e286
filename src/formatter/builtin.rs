//! Formatters shipped with the registry
//!
//! - [`write_text`]: quoted text with doubled quotes and CRLF folded to LF
//! - [`write_datetime`]: sortable, locale-independent UTC timestamp
//! - [`write_verbatim`]: default textual conversion for everything else

use std::io::{self, Write};

use crate::source::Value;

/// `YYYY-MM-DD HH:MM:SSZ`, always in UTC.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Write a text value wrapped in double quotes.
///
/// Embedded `"` become `""` and every CRLF becomes a single LF. Separators
/// are not escaped.
pub fn write_text(value: &Value, out: &mut dyn Write) -> io::Result<()> {
    match value {
        Value::Text(s) => write_quoted(s, out),
        other => write_quoted(&other.to_string(), out),
    }
}

/// Write a timestamp in [`DATETIME_FORMAT`].
///
/// Non-timestamp values fall through to [`write_verbatim`].
pub fn write_datetime(value: &Value, out: &mut dyn Write) -> io::Result<()> {
    match value {
        Value::DateTime(dt) => write!(out, "{}", dt.format(DATETIME_FORMAT)),
        other => write_verbatim(other, out),
    }
}

/// Write the value's default textual form
pub fn write_verbatim(value: &Value, out: &mut dyn Write) -> io::Result<()> {
    write!(out, "{}", value)
}

fn write_quoted(s: &str, out: &mut dyn Write) -> io::Result<()> {
    out.write_all(b"\"")?;

    let mut rest = s;
    while let Some(pos) = rest.find(['"', '\r']) {
        out.write_all(rest[..pos].as_bytes())?;
        let tail = &rest[pos..];
        if tail.starts_with('"') {
            out.write_all(b"\"\"")?;
            rest = &tail[1..];
        } else if tail.starts_with("\r\n") {
            out.write_all(b"\n")?;
            rest = &tail[2..];
        } else {
            // lone CR
            out.write_all(b"\r")?;
            rest = &tail[1..];
        }
    }
    out.write_all(rest.as_bytes())?;

    out.write_all(b"\"")
}
