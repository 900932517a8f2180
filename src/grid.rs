// File: src/grid.rs
//! Walks the CSV export of a planning sheet.
//!
//! The sheet alternates a row of dates with the row holding the courses of
//! those dates. Rows without any `D/M` pair (titles, week numbers, blanks)
//! are skipped.
use crate::model::{
    AcademicYear, CancelledEntry, CellEvent, WholeCancellations, contains_day_month,
    first_day_month,
};
use crate::parser::{Vocabulary, parse_cell};
use anyhow::{Context, Result};

pub type Grid = Vec<Vec<String>>;

/// Reads a CSV payload into rows of cells. Rows may have different lengths.
pub fn parse_csv(payload: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(payload.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to parse CSV row")?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

pub fn row_contains_date(row: &[String]) -> bool {
    row.iter().any(|cell| contains_day_month(cell))
}

/// Everything the walker needs besides the grid itself.
pub struct WalkContext<'a> {
    pub year: AcademicYear,
    pub whole: &'a WholeCancellations,
    pub partial: &'a [CancelledEntry],
    pub vocab: &'a Vocabulary,
}

/// Pairs each date row with the row right after it and parses the cells.
///
/// A date row directly followed by another date row consumes it as its
/// content row, so the second row's dates yield nothing.
pub fn walk(grid: &[Vec<String>], ctx: &WalkContext<'_>) -> Vec<CellEvent> {
    let mut events = Vec::new();
    let mut i = 0;
    while i < grid.len() {
        if !row_contains_date(&grid[i]) {
            i += 1;
            continue;
        }
        if let Some(content_row) = grid.get(i + 1) {
            walk_pair(&grid[i], content_row, ctx, &mut events);
        }
        i += 2;
    }
    events
}

fn walk_pair(
    date_row: &[String],
    content_row: &[String],
    ctx: &WalkContext<'_>,
    events: &mut Vec<CellEvent>,
) {
    for (date_cell, content_cell) in date_row.iter().zip(content_row) {
        if content_cell.trim().is_empty() {
            continue;
        }
        let Some(date) = first_day_month(date_cell, ctx.year) else {
            continue;
        };

        if let Some(source) = ctx.whole.source(&date) {
            log::info!("Skipping {} ({})", date, source);
            continue;
        }

        log::debug!("Parsing courses of {}", date);
        let parsed = parse_cell(content_cell, date, ctx.partial, ctx.vocab);
        for event in &parsed {
            log::debug!("Found event: {}", event.title);
        }
        events.extend(parsed);
    }
}
