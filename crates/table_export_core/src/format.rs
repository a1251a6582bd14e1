use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{to_markdown, try_to_csv_with, CsvOptions, SerializeError, TableModel};

/// Text format of an exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Markdown => "text/markdown;charset=utf-8",
        }
    }

    /// Label shown next to the extension in save dialogs.
    pub fn filter_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Markdown => "Markdown",
        }
    }

    /// Serialize `model` in this format. Only the CSV writer can fail.
    pub fn render(
        self,
        model: &TableModel,
        csv_options: CsvOptions,
    ) -> Result<String, SerializeError> {
        match self {
            ExportFormat::Csv => try_to_csv_with(&model.headers, &model.records, csv_options),
            ExportFormat::Markdown => Ok(to_markdown(&model.headers, &model.records)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format `{0}` (expected csv or markdown)")]
pub struct ParseFormatError(String);

impl FromStr for ExportFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}
