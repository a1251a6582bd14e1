use serde::Serialize;

/// One body row, positionally aligned with the header list of its table.
///
/// Cells are stored by column position rather than by header name so that
/// tables with repeated header values keep every column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    cells: Vec<String>,
}

impl Record {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at `index`, or `""` when the row is shorter than that.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Canonical header/record model extracted from a rendered table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableModel {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl TableModel {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    /// Position of the first column titled `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Value of `header` in record `row`. Missing cells resolve to `""`;
    /// `None` means the row or the header does not exist.
    pub fn value(&self, row: usize, header: &str) -> Option<&str> {
        let record = self.records.get(row)?;
        let column = self.column_index(header)?;
        Some(record.cell(column))
    }
}

/// Positional headers `Col1..ColN` for tables without a usable header row.
pub fn synthesized_headers(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Col{i}")).collect()
}
