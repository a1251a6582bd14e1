use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use table_export_core::ExportFormat;

#[derive(Debug, Parser)]
#[command(name = "tablex")]
#[command(about = "Extract HTML tables and export them as CSV or Markdown", long_about = None)]
pub struct Cli {
    /// RON configuration file (missing file means defaults)
    #[arg(long, global = true, default_value = "tablex.ron")]
    pub config: PathBuf,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the tables found in a page
    List(ListArgs),
    /// Print one table as CSV or Markdown
    Render(RenderArgs),
    /// Save a table through the save dialog or as a download
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// HTML file to read, `-` for stdin
    pub input: PathBuf,

    /// Character encoding of the input (detected when omitted)
    #[arg(long)]
    pub charset: Option<String>,

    /// Base URL for resolving relative links in cells
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the extracted tables as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format: csv or markdown
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Zero-based index of the table to print
    #[arg(long, default_value_t = 0)]
    pub table: usize,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Suggested file name (defaults to search-results-<epoch-ms>.<ext>)
    #[arg(long)]
    pub name: Option<String>,

    /// Output format: csv or markdown
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Zero-based index of the table to export (first table when omitted)
    #[arg(long)]
    pub table: Option<usize>,

    /// Directory that receives downloads
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Ask for the target path in a native save dialog first
    #[arg(long)]
    pub dialog: bool,
}
