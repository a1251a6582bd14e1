use crate::Record;

const SEPARATOR_CELL: &str = "---";

/// GFM pipe table: header row, `---` separator row, then one row per record.
///
/// Returns an empty string when there are no headers, since a pipe table
/// without columns is not valid Markdown.
pub fn to_markdown(headers: &[String], records: &[Record]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(render_row(headers.iter().map(|h| escape_markdown_cell(h))));
    lines.push(render_row(headers.iter().map(|_| SEPARATOR_CELL.to_string())));
    for record in records {
        lines.push(render_row(
            (0..headers.len()).map(|i| escape_markdown_cell(record.cell(i))),
        ));
    }
    lines.join("\n")
}

fn render_row(cells: impl Iterator<Item = String>) -> String {
    let joined = cells.collect::<Vec<_>>().join(" | ");
    format!("| {joined} |")
}

/// Make cell text safe inside a single table row: `|` becomes `\|`, each run
/// of line breaks becomes one space, and surrounding whitespace is trimmed.
pub fn escape_markdown_cell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut in_break = false;
    for ch in text.trim().chars() {
        match ch {
            '\n' | '\r' => {
                if !in_break {
                    escaped.push(' ');
                }
                in_break = true;
                continue;
            }
            '|' => escaped.push_str("\\|"),
            _ => escaped.push(ch),
        }
        in_break = false;
    }
    escaped
}
