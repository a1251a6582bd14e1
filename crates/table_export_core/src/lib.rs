//! Table export core: pure table model and text serializers.
mod delimited;
mod format;
mod markdown;
mod model;
mod outcome;

pub use delimited::{
    to_csv, try_to_csv_with, CsvOptions, HeaderQuoting, SerializeError,
};
pub use format::{ExportFormat, ParseFormatError};
pub use markdown::{escape_markdown_cell, to_markdown};
pub use model::{synthesized_headers, Record, TableModel};
pub use outcome::SaveOutcome;
