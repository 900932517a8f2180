// File: src/markup/table.rs
//! Rectangular view of the HTML tables of a published sheet.
//!
//! The markup is parsed once; afterwards "the date above this cell" is a
//! plain index lookup instead of a DOM walk.
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// An inline run (`<span>`) inside a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineRun {
    pub style: String,
    /// Text nodes trimmed and concatenated.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupCell {
    pub classes: Vec<String>,
    /// Text nodes trimmed and joined with a single space.
    pub text: String,
    pub runs: Vec<InlineRun>,
}

impl MarkupCell {
    fn from_element(cell: ElementRef<'_>, span: &Selector) -> Self {
        let runs = cell
            .select(span)
            .map(|run| InlineRun {
                style: run.value().attr("style").unwrap_or_default().to_string(),
                text: run.text().map(str::trim).collect::<String>(),
            })
            .collect();

        Self {
            classes: cell.value().classes().map(str::to_string).collect(),
            text: cell
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            runs,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Rows sharing one parent element (usually a `<tbody>`), in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupTable {
    pub rows: Vec<Vec<MarkupCell>>,
}

impl MarkupTable {
    pub fn cell(&self, row: usize, col: usize) -> Option<&MarkupCell> {
        self.rows.get(row)?.get(col)
    }

    /// The cell governing `(row, col)`: same column, previous row.
    pub fn date_cell(&self, row: usize, col: usize) -> Option<&MarkupCell> {
        self.cell(row.checked_sub(1)?, col)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkupDocument {
    /// Contents of every `<style>` element.
    pub style_sheets: Vec<String>,
    pub tables: Vec<MarkupTable>,
}

impl MarkupDocument {
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let style = selector("style");
        let tr = selector("tr");
        let td = selector("td");
        let span = selector("span");

        let style_sheets = doc
            .select(&style)
            .map(|s| s.text().collect::<String>())
            .collect();

        let mut tables: Vec<MarkupTable> = Vec::new();
        let mut by_parent = HashMap::new();
        for row in doc.select(&tr) {
            let Some(parent) = row.parent() else {
                continue;
            };
            let slot = *by_parent.entry(parent.id()).or_insert_with(|| {
                tables.push(MarkupTable::default());
                tables.len() - 1
            });
            let cells = row
                .select(&td)
                .map(|cell| MarkupCell::from_element(cell, &span))
                .collect();
            tables[slot].rows.push(cells);
        }

        Self {
            style_sheets,
            tables,
        }
    }
}
