//! Stanza scan over decoded index lines

use nbs_types::IndexEntry;

/// Find `package` in `Packages` lines.
///
/// Records are delimited by blank lines or by a new `Package:` field. Within
/// the matching record the first `Version:` and `Filename:` win, and the scan
/// stops as soon as both are known, so the earliest complete record for the
/// package is returned.
#[must_use]
pub fn find_package<S: AsRef<str>>(lines: &[S], package: &str) -> Option<IndexEntry> {
    let mut in_record = false;
    let mut version: Option<&str> = None;
    let mut filename: Option<&str> = None;

    for line in lines {
        let line = line.as_ref().trim();

        if line.is_empty() {
            in_record = false;
            continue;
        }

        if let Some(name) = field(line, "Package") {
            in_record = name == package;
            version = None;
            filename = None;
        } else if in_record {
            if let Some(value) = field(line, "Version") {
                version.get_or_insert(value);
            } else if let Some(value) = field(line, "Filename") {
                filename.get_or_insert(value);
            }
        }

        if let (true, Some(version), Some(filename)) = (in_record, version, filename) {
            return Some(IndexEntry {
                filename: filename.to_string(),
                version: version.to_string(),
            });
        }
    }

    None
}

fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)?
        .strip_prefix(':')
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
