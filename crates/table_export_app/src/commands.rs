use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use export_logging::export_info;
use table_export_core::{CsvOptions, TableModel};
use table_export_engine::{
    decode_html, DownloadDirDocument, ExporterConfig, HtmlTableExtractor, SaveCapabilities,
    TableExporter, TableExtractor,
};

use crate::cli::{Commands, ExportArgs, InputArgs, ListArgs, RenderArgs};
use crate::config::AppConfig;

pub fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::List(args) => list(args, config),
        Commands::Render(args) => render(args, config),
        Commands::Export(args) => export(args, config),
    }
}

fn list(args: ListArgs, config: &AppConfig) -> anyhow::Result<()> {
    let (html, extractor) = load_input(&args.input, config)?;
    let tables = extractor.extract_all(&html);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }
    if tables.is_empty() {
        println!("no tables found");
    }
    for line in describe_tables(&tables) {
        println!("{line}");
    }
    Ok(())
}

fn render(args: RenderArgs, config: &AppConfig) -> anyhow::Result<()> {
    let (html, extractor) = load_input(&args.input, config)?;
    let tables = extractor.extract_all(&html);
    let model = select_table(&tables, args.table)?;
    let format = args.format.unwrap_or(config.default_format);
    println!("{}", format.render(model, csv_options(config))?);
    Ok(())
}

fn export(args: ExportArgs, config: &AppConfig) -> anyhow::Result<()> {
    let (html, extractor) = load_input(&args.input, config)?;
    let format = args.format.unwrap_or(config.default_format);
    let download_dir = args
        .download_dir
        .clone()
        .unwrap_or_else(|| config.resolved_download_dir());

    let mut capabilities = SaveCapabilities::none()
        .with_document(Arc::new(DownloadDirDocument::new(download_dir)));
    if args.dialog || config.native_dialog {
        capabilities = with_native_dialog(capabilities);
    }

    let exporter_config = ExporterConfig {
        csv_options: csv_options(config),
        ..ExporterConfig::default()
    };
    let exporter = TableExporter::new(capabilities)
        .with_extractor(Arc::new(extractor.clone()))
        .with_config(exporter_config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start async runtime")?;
    let name = args.name.as_deref();
    let outcome = match args.table {
        None => runtime.block_on(exporter.export_table_as(&html, name, format)),
        Some(index) => {
            let tables = extractor.extract_all(&html);
            let model = select_table(&tables, index)?;
            runtime.block_on(exporter.export_model(model, name, format))
        }
    };

    export_info!("Export finished: {}", outcome);
    if outcome.is_saved() {
        println!("{outcome}");
    } else {
        println!("{outcome}: nothing was saved");
    }
    Ok(())
}

#[cfg(feature = "native-dialog")]
fn with_native_dialog(capabilities: SaveCapabilities) -> SaveCapabilities {
    capabilities.with_native(Arc::new(table_export_engine::RfdNativeSave::new()))
}

#[cfg(not(feature = "native-dialog"))]
fn with_native_dialog(capabilities: SaveCapabilities) -> SaveCapabilities {
    export_logging::export_warn!("Built without the native-dialog feature; saving as a download");
    capabilities
}

fn csv_options(config: &AppConfig) -> CsvOptions {
    CsvOptions {
        header_quoting: config.header_quoting,
    }
}

fn load_input(
    input: &InputArgs,
    config: &AppConfig,
) -> anyhow::Result<(String, HtmlTableExtractor)> {
    let bytes = read_input(&input.input)?;
    let decoded = decode_html(&bytes, input.charset.as_deref())?;
    export_info!(
        "Read {} bytes from {:?} as {}",
        bytes.len(),
        input.input,
        decoded.encoding_label
    );
    let base_url = input.base_url.as_deref().or(config.base_url.as_deref());
    Ok((decoded.html, HtmlTableExtractor::with_base_url(base_url)))
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
        return Ok(bytes);
    }
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn select_table(tables: &[TableModel], index: usize) -> anyhow::Result<&TableModel> {
    match tables.get(index) {
        Some(model) => Ok(model),
        None if tables.is_empty() => bail!("no tables found"),
        None => bail!(
            "table index {index} out of range ({} tables found)",
            tables.len()
        ),
    }
}

fn describe_tables(tables: &[TableModel]) -> Vec<String> {
    tables
        .iter()
        .enumerate()
        .map(|(index, table)| {
            format!(
                "#{index}: {} columns, {} rows [{}]",
                table.headers.len(),
                table.records.len(),
                table.headers.join(", ")
            )
        })
        .collect()
}
