// File: src/markup/strike.rs
//! Detects struck-through (cancelled) entries in a published sheet.
//!
//! Two granularities exist in the markup:
//! - a CSS class with `text-decoration: line-through` applied to a whole
//!   cell cancels every event of the date above it;
//! - an inline `<span style="text-decoration: line-through">` cancels only
//!   the run of text it wraps.
use crate::markup::table::{MarkupDocument, MarkupTable};
use crate::model::{AcademicYear, CalendarDate, CancelledEntry, Cancellations, all_day_months};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Shorthand and `-line` long-form spellings.
static STRIKETHROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"text-decoration(?:-line)?:\s*line-through").unwrap());

/// `.name{ declarations }`
static CLASS_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([A-Za-z0-9_-]+)\s*\{([^}]*)\}").unwrap());

pub fn has_strikethrough(text: &str) -> bool {
    STRIKETHROUGH.is_match(text)
}

/// Class names whose rule body strikes text through.
pub fn struck_classes(css: &str) -> BTreeSet<String> {
    CLASS_RULE
        .captures_iter(css)
        .filter(|caps| has_strikethrough(&caps[2]))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Scans one markup variant. `None` means the markup carries no
/// strikethrough styling at all, so another variant may be worth trying.
pub fn scan(markup: &str, year: AcademicYear) -> Option<Cancellations> {
    if !has_strikethrough(markup) {
        log::debug!("Markup carries no strikethrough styling");
        return None;
    }
    let doc = MarkupDocument::parse(markup);
    Some(scan_document(&doc, year))
}

pub fn scan_document(doc: &MarkupDocument, year: AcademicYear) -> Cancellations {
    let mut found = Cancellations::default();

    let classes: BTreeSet<String> = doc
        .style_sheets
        .iter()
        .flat_map(|css| struck_classes(css))
        .collect();
    if !classes.is_empty() {
        log::info!("Strikethrough CSS classes: {:?}", classes);
    }

    for table in &doc.tables {
        scan_struck_cells(table, &classes, year, &mut found);
        scan_struck_runs(table, year, &mut found);
    }

    found
}

fn dates_above(table: &MarkupTable, row: usize, col: usize, year: AcademicYear) -> Vec<CalendarDate> {
    match table.date_cell(row, col) {
        Some(cell) => all_day_months(&cell.text, year),
        None => {
            log::debug!("No date cell above row {} column {}", row, col);
            Vec::new()
        }
    }
}

fn scan_struck_cells(
    table: &MarkupTable,
    classes: &BTreeSet<String>,
    year: AcademicYear,
    found: &mut Cancellations,
) {
    if classes.is_empty() {
        return;
    }
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !classes.iter().any(|class| cell.has_class(class)) {
                continue;
            }
            for date in dates_above(table, r, c, year) {
                if found.whole.insert(date) {
                    log::info!("Whole day cancelled: {}", date);
                }
            }
        }
    }
}

fn scan_struck_runs(table: &MarkupTable, year: AcademicYear, found: &mut Cancellations) {
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            for run in cell.runs.iter().filter(|run| has_strikethrough(&run.style)) {
                let content = run.text.trim();
                if content.is_empty() {
                    continue;
                }
                for date in dates_above(table, r, c, year) {
                    let entry = CancelledEntry::partial(date, content);
                    if !found.partial.contains(&entry) {
                        log::info!("Partly cancelled on {}: {}", date, content);
                        found.partial.push(entry);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: AcademicYear = AcademicYear { fall_year: 2025 };

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    const SHEET: &str = r#"<html><head><style>
        .ritz .waffle .s0{background-color:#ffffff;}
        .ritz .waffle .s4{text-decoration:line-through;color:#000000;}
        .ritz .waffle .s5{text-decoration-line: line-through;}
    </style></head><body>
    <table class="waffle"><tbody>
      <tr><th>1</th><td class="s0">Lundi 15/09</td><td class="s0">Mardi 16/09</td><td class="s0">Lundi 12/01</td></tr>
      <tr><th>2</th><td class="s4">9h-12h: Atelier</td>
          <td class="s0">9h-12h: <span style="text-decoration: line-through; color: red"> Projet </span>
              <br>14h-17h: TP</td>
          <td class="s5 s0">Séminaire</td></tr>
    </tbody></table></body></html>"#;

    #[test]
    fn test_struck_classes() {
        let classes = struck_classes(".a{color:red}.b {text-decoration: line-through}.c{}");
        assert_eq!(classes, BTreeSet::from(["b".to_string()]));
    }

    #[test]
    fn test_scan_sheet() {
        let found = scan(SHEET, YEAR).expect("sheet has strikethrough");
        assert_eq!(
            found.whole,
            BTreeSet::from([date(2025, 9, 15), date(2026, 1, 12)])
        );
        assert_eq!(
            found.partial,
            vec![CancelledEntry::partial(date(2025, 9, 16), "Projet")]
        );
    }

    #[test]
    fn test_no_strikethrough_means_none() {
        let html = "<table><tr><td>1/10</td></tr><tr><td>9h-12h</td></tr></table>";
        assert!(scan(html, YEAR).is_none());
    }

    #[test]
    fn test_struck_first_row_is_skipped() {
        let html = r#"<style>.x{text-decoration:line-through}</style>
            <table><tr><td class="x">1/10</td></tr></table>"#;
        let found = scan(html, YEAR).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_class_without_date_above_is_skipped() {
        let html = r#"<style>.x{text-decoration:line-through}</style>
            <table><tr><td>Semaine 1</td></tr><tr><td class="x">Cours</td></tr></table>"#;
        let found = scan(html, YEAR).unwrap();
        assert!(found.whole.is_empty());
    }
}
