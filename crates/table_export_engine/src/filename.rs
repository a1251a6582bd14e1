use std::path::Path;

use table_export_core::ExportFormat;

pub const DEFAULT_FILENAME_PREFIX: &str = "search-results";

const MAX_STEM_LEN: usize = 120;

/// Name for an exported file: the caller's default when it survives
/// sanitizing, otherwise `search-results-{epoch_ms}.{ext}`. A default that
/// does not already end in the format's extension gets it appended, so
/// `v1.2` becomes `v1.2.csv`.
pub fn export_filename(default: Option<&str>, format: ExportFormat, epoch_ms: i64) -> String {
    let ext = format.extension();
    match default.map(sanitize_filename).filter(|name| !name.is_empty()) {
        Some(name) if has_extension(&name, ext) => name,
        Some(name) => format!("{name}.{ext}"),
        None => format!("{DEFAULT_FILENAME_PREFIX}-{epoch_ms}.{ext}"),
    }
}

/// Windows-safe file name: forbidden characters become `_`, runs of `_`
/// collapse, leading/trailing `_`, spaces and dots are trimmed, reserved
/// device names get a trailing `_`.
pub fn sanitize_filename(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    let mut compacted = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.trim_matches(&['_', ' ', '.'][..]).chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    if compacted.chars().count() > MAX_STEM_LEN {
        compacted = compacted.chars().take(MAX_STEM_LEN).collect();
    }
    let stem_len = compacted.find('.').unwrap_or(compacted.len());
    if is_reserved_windows_name(&compacted[..stem_len]) {
        compacted.insert(stem_len, '_');
    }
    compacted
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|found| found.to_str())
        .is_some_and(|found| found.eq_ignore_ascii_case(ext))
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
