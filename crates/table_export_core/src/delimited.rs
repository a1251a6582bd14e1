use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::Record;

/// How the CSV header line is written.
///
/// Data fields are always quoted. Earlier exports wrote the header line as a
/// bare comma join, which breaks on header text containing commas or quotes;
/// `Bare` reproduces that output byte for byte, `Uniform` quotes the header
/// the same way as the data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderQuoting {
    #[default]
    Uniform,
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsvOptions {
    pub header_quoting: HeaderQuoting,
}

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("csv writer error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv writer could not be flushed: {0}")]
    Flush(String),
    #[error("csv output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// CSV with the default options: every field quoted, rows joined by `\n`.
///
/// Writing to memory does not fail in practice; should the writer ever
/// report an error, an empty string is returned. Callers that persist the
/// text go through [`try_to_csv_with`] instead.
pub fn to_csv(headers: &[String], records: &[Record]) -> String {
    try_to_csv_with(headers, records, CsvOptions::default()).unwrap_or_default()
}

/// CSV with explicit options.
pub fn try_to_csv_with(
    headers: &[String],
    records: &[Record],
    options: CsvOptions,
) -> Result<String, SerializeError> {
    // A record with no fields has no quoted representation; each row is an
    // empty line.
    if headers.is_empty() {
        return Ok("\n".repeat(records.len()));
    }

    let mut buffer = Vec::new();
    if options.header_quoting == HeaderQuoting::Bare {
        buffer.extend_from_slice(headers.join(",").as_bytes());
        buffer.push(b'\n');
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(buffer);

    if options.header_quoting == HeaderQuoting::Uniform {
        writer.write_record(headers)?;
    }
    for record in records {
        writer.write_record((0..headers.len()).map(|i| record.cell(i)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| SerializeError::Flush(err.error().to_string()))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
