use ego_tree::NodeRef;
use export_logging::export_warn;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use table_export_core::{synthesized_headers, Record, TableModel};
use url::Url;

pub trait TableExtractor: Send + Sync {
    /// First table of the container in document order, if any.
    fn extract_first(&self, html: &str) -> Option<TableModel>;

    /// Every table of the container in document order.
    fn extract_all(&self, html: &str) -> Vec<TableModel>;
}

/// Extracts `<table>` elements from rendered HTML.
///
/// - header row: first `<tr>` of the first `<thead>`, empty header cells dropped
/// - body rows: `<tr>` children of `<tbody>` sections and of the table itself
/// - no usable header row: `Col1..ColN` sized to the first body row
/// - cell value: target of the first `<a href>` in the cell, else its trimmed text
#[derive(Debug, Default, Clone)]
pub struct HtmlTableExtractor {
    base_url: Option<Url>,
}

impl HtmlTableExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative link targets against `base`. An unparsable base is
    /// ignored and links are kept as written.
    pub fn with_base_url(base: Option<&str>) -> Self {
        let base_url = base.and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                export_warn!("Ignoring invalid base url {:?}: {}", raw, err);
                None
            }
        });
        Self { base_url }
    }
}

impl TableExtractor for HtmlTableExtractor {
    fn extract_first(&self, html: &str) -> Option<TableModel> {
        let document = Html::parse_document(html);
        let table = find_tables(&document).next()?;
        Some(extract_table(table, self.base_url.as_ref()))
    }

    fn extract_all(&self, html: &str) -> Vec<TableModel> {
        let document = Html::parse_document(html);
        find_tables(&document)
            .map(|table| extract_table(table, self.base_url.as_ref()))
            .collect()
    }
}

/// All `<table>` elements of `document` in document order, nested ones included.
pub fn find_tables(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "table")
}

/// Build the header/record model of a single `<table>` element.
pub fn extract_table(table: ElementRef<'_>, base_url: Option<&Url>) -> TableModel {
    let mut header_row = None;
    let mut body_rows = Vec::new();

    for section in child_elements(table) {
        match section.value().name() {
            "thead" => {
                if header_row.is_none() {
                    header_row = child_elements(section).find(|row| is_row(*row));
                }
            }
            "tbody" => body_rows.extend(child_elements(section).filter(|row| is_row(*row))),
            "tr" => body_rows.push(section),
            _ => {}
        }
    }

    let mut headers: Vec<String> = header_row
        .map(|row| {
            row_cells(row)
                .map(visible_text)
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if headers.is_empty() {
        if let Some(first) = body_rows.first() {
            headers = synthesized_headers(row_cells(*first).count());
        }
    }

    let records = body_rows
        .iter()
        .map(|row| {
            let cells: Vec<ElementRef<'_>> = row_cells(*row).collect();
            (0..headers.len())
                .map(|i| {
                    cells
                        .get(i)
                        .map(|cell| cell_value(*cell, base_url))
                        .unwrap_or_default()
                })
                .collect::<Record>()
        })
        .collect();

    TableModel::new(headers, records)
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn is_row(element: ElementRef<'_>) -> bool {
    element.value().name() == "tr"
}

fn row_cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(row).filter(|cell| matches!(cell.value().name(), "td" | "th"))
}

fn cell_value(cell: ElementRef<'_>, base_url: Option<&Url>) -> String {
    match first_link_target(cell) {
        Some(href) => resolve_href(href, base_url),
        None => visible_text(cell),
    }
}

fn first_link_target<'a>(cell: ElementRef<'a>) -> Option<&'a str> {
    cell.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
}

fn resolve_href(href: &str, base_url: Option<&Url>) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base_url
        .and_then(|base| base.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}

/// Text as a browser lays it out: runs of source whitespace collapse to one
/// space, `<br>` separates words, hidden elements contribute nothing.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        collect_text(child, &mut text);
    }
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            match element.name() {
                "script" | "style" | "template" => return,
                "br" => out.push(' '),
                _ => {}
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_href_is_kept_verbatim() {
        let base = Url::parse("https://base.example/dir/").unwrap();
        assert_eq!(
            resolve_href("https://other.example/x", Some(&base)),
            "https://other.example/x"
        );
    }

    #[test]
    fn relative_href_resolves_against_base() {
        let base = Url::parse("https://base.example/dir/").unwrap();
        assert_eq!(
            resolve_href("page?id=1", Some(&base)),
            "https://base.example/dir/page?id=1"
        );
    }

    #[test]
    fn relative_href_without_base_is_kept() {
        assert_eq!(resolve_href("/docs/a", None), "/docs/a");
    }

    #[test]
    fn script_text_is_not_visible() {
        let document =
            Html::parse_fragment("<div>shown<script>hidden()</script><style>p{}</style></div>");
        let div = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "div")
            .unwrap();
        assert_eq!(visible_text(div), "shown");
    }

    #[test]
    fn source_whitespace_collapses_like_rendered_text() {
        let document = Html::parse_fragment(
            "<div>\n    Read the doc\n\t   or <b>this</b>\r\n  one<br>two\u{a0}x  </div>",
        );
        let div = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "div")
            .unwrap();
        assert_eq!(visible_text(div), "Read the doc or this one two\u{a0}x");
    }
}
