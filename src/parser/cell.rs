// File: src/parser/cell.rs
//! Free-text planning cell -> events.
//!
//! A cell holds one or more blocks separated by blank lines. A block with
//! time ranges (`9h-12h: Atelier`) produces one timed event per range; a
//! block without any produces a single all-day event.
use crate::model::{CalendarDate, CancelledEntry, CellEvent};
use crate::parser::time_range::{parse_time, time_ranges};
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// "Firstname Lastname", both capitalized. Accented letters count, so
/// "Hélène Durand" matches, and so does any two-word capitalized line such
/// as "Réunion Pédagogique".
static PERSON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+").unwrap());

pub const PLACEHOLDER_TITLE: &str = "Event";

/// Names that mark a line as the instructor line even when it does not look
/// like "Firstname Lastname".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub instructor_names: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            instructor_names: vec!["Mohammed".to_string(), "Marie".to_string()],
        }
    }
}

impl Vocabulary {
    pub fn new(instructor_names: Vec<String>) -> Self {
        Self { instructor_names }
    }

    pub fn is_instructor_line(&self, line: &str) -> bool {
        PERSON_NAME.is_match(line)
            || self
                .instructor_names
                .iter()
                .any(|n| !n.is_empty() && line.contains(n.as_str()))
    }
}

/// A blank-line delimited chunk of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub raw: &'a str,
    pub lines: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot<'a> {
    pub line: &'a str,
    pub start_token: &'a str,
    pub end_token: &'a str,
    pub title_guess: &'a str,
}

impl TimeSlot<'_> {
    fn range_text(&self) -> String {
        format!("{}-{}", self.start_token, self.end_token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockShape<'a> {
    Timed {
        slots: Vec<TimeSlot<'a>>,
        instructor: Option<&'a str>,
        description: Vec<&'a str>,
    },
    /// No time range anywhere: first line is the title, the rest is the
    /// description, and the event spans the whole day.
    AllDayFallback,
}

pub fn split_blocks(cell_text: &str) -> Vec<Block<'_>> {
    BLANK_LINE
        .split(cell_text.trim())
        .filter_map(|raw| {
            let lines: Vec<&str> = raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            (!lines.is_empty()).then_some(Block { raw, lines })
        })
        .collect()
}

pub fn classify_block<'a>(block: &Block<'a>, vocab: &Vocabulary) -> BlockShape<'a> {
    let mut slots = Vec::new();
    let mut instructor = None;
    let mut description = Vec::new();

    for &line in &block.lines {
        let before = slots.len();
        for m in time_ranges(line) {
            slots.push(TimeSlot {
                line,
                start_token: m.start_token,
                end_token: m.end_token,
                title_guess: m.title_guess(line),
            });
        }
        if slots.len() > before {
            continue;
        }

        if vocab.is_instructor_line(line) {
            // First instructor wins; later candidates are dropped.
            if instructor.is_none() {
                instructor = Some(line);
            }
        } else {
            description.push(line);
        }
    }

    if slots.is_empty() {
        BlockShape::AllDayFallback
    } else {
        BlockShape::Timed {
            slots,
            instructor,
            description,
        }
    }
}

/// Parses a planning cell for `date`. `partial` may hold entries for any
/// date; only those for `date` are considered.
pub fn parse_cell(
    cell_text: &str,
    date: CalendarDate,
    partial: &[CancelledEntry],
    vocab: &Vocabulary,
) -> Vec<CellEvent> {
    let mut events = Vec::new();
    if cell_text.trim().is_empty() {
        return events;
    }

    let needles: Vec<&str> = partial
        .iter()
        .filter(|c| c.date == date)
        .filter_map(CancelledEntry::needle)
        .collect();
    if !needles.is_empty() {
        log::debug!("Partial cancellations on {}: {:?}", date, needles);
    }

    for block in split_blocks(cell_text) {
        match classify_block(&block, vocab) {
            BlockShape::Timed {
                slots,
                instructor,
                description,
            } => {
                timed_events(
                    &block,
                    &slots,
                    instructor,
                    &description,
                    date,
                    &needles,
                    &mut events,
                );
            }
            BlockShape::AllDayFallback => {
                if let Some(event) = all_day_event(&block, date, &needles) {
                    events.push(event);
                }
            }
        }
    }

    events
}

fn resolve_title<'a>(slot: &TimeSlot<'a>, description: &[&'a str]) -> &'a str {
    if !slot.title_guess.is_empty() {
        slot.title_guess
    } else {
        description.first().copied().unwrap_or(PLACEHOLDER_TITLE)
    }
}

/// Substring matching across the block, its lines and the literal range.
/// This can over-suppress: a cancelled text found anywhere in the block
/// drops every range of that block.
fn slot_cancelled(block: &Block<'_>, slot: &TimeSlot<'_>, needles: &[&str]) -> bool {
    let range = slot.range_text();
    needles.iter().any(|needle| {
        block.raw.contains(needle)
            || block.lines.iter().any(|l| l.contains(needle))
            || *needle == range
    })
}

fn timed_events(
    block: &Block<'_>,
    slots: &[TimeSlot<'_>],
    instructor: Option<&str>,
    description: &[&str],
    date: CalendarDate,
    needles: &[&str],
    out: &mut Vec<CellEvent>,
) {
    for (idx, slot) in slots.iter().enumerate() {
        if slot_cancelled(block, slot, needles) {
            log::info!("Skipping cancelled event on {}: {}", date, slot.line);
            continue;
        }

        let (Some(start), Some(end)) = (parse_time(slot.start_token), parse_time(slot.end_token))
        else {
            log::warn!("Skipping event with unreadable time on {}: {}", date, slot.line);
            continue;
        };

        let base_title = resolve_title(slot, description);
        let title = match instructor {
            Some(name) if !base_title.contains(name) => format!("{} - {}", base_title, name),
            _ => base_title.to_string(),
        };

        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = instructor
            && !base_title.contains(name)
        {
            parts.push(name.to_string());
        }
        for (other_idx, other) in slots.iter().enumerate() {
            if other_idx != idx {
                parts.push(format!(
                    "{}: {}",
                    other.range_text(),
                    resolve_title(other, description)
                ));
            }
        }
        parts.extend(description.iter().map(|l| l.to_string()));

        out.push(CellEvent::timed(date, start, end, title, parts.join("\n")));
    }
}

fn all_day_event(block: &Block<'_>, date: CalendarDate, needles: &[&str]) -> Option<CellEvent> {
    if let Some(needle) = needles.iter().find(|n| block.raw.contains(**n)) {
        log::info!("Skipping cancelled all-day block on {}: {}", date, needle);
        return None;
    }
    let (title, rest) = block.lines.split_first()?;
    Some(CellEvent::all_day(date, *title, rest.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventWhen, ParsedTime};

    fn day() -> CalendarDate {
        CalendarDate::new(2025, 10, 6).unwrap()
    }

    #[test]
    fn test_single_range_with_instructor() {
        let events = parse_cell(
            "9h-12h: Atelier\nMarie Dupont",
            day(),
            &[],
            &Vocabulary::default(),
        );
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.title, "Atelier - Marie Dupont");
        assert_eq!(e.start(), Some(ParsedTime::new(9, 0)));
        assert_eq!(e.end(), Some(ParsedTime::new(12, 0)));
        assert_eq!(e.description, "Marie Dupont");
    }

    #[test]
    fn test_accented_two_word_lines_are_instructors() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_instructor_line("Hélène Durand"));
        assert!(vocab.is_instructor_line("Réunion Pédagogique"));
        assert!(!vocab.is_instructor_line("salle B12"));
        assert!(!vocab.is_instructor_line("Amphi B"));

        let events = parse_cell("9h-12h: Atelier\nRéunion Pédagogique", day(), &[], &vocab);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Atelier - Réunion Pédagogique");
        assert_eq!(events[0].description, "Réunion Pédagogique");
    }

    #[test]
    fn test_instructor_already_in_title() {
        let events = parse_cell(
            "14h-16h: Cours de Marie Dupont\nMarie Dupont\nSalle 12",
            day(),
            &[],
            &Vocabulary::default(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Cours de Marie Dupont");
        assert_eq!(events[0].description, "Salle 12");
    }

    #[test]
    fn test_empty_cell() {
        assert!(parse_cell("  \n \n", day(), &[], &Vocabulary::default()).is_empty());
    }

    #[test]
    fn test_two_blocks_are_independent() {
        let events = parse_cell(
            "9h-12h: Atelier\n\n14h30-17h: Projet",
            day(),
            &[],
            &Vocabulary::default(),
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Atelier");
        assert_eq!(events[0].description, "");
        assert_eq!(events[1].title, "Projet");
        assert_eq!(events[1].start(), Some(ParsedTime::new(14, 30)));
        assert_eq!(events[1].end(), Some(ParsedTime::new(17, 0)));
    }

    #[test]
    fn test_several_ranges_in_one_block() {
        let events = parse_cell(
            "9h-12h: Matin\n13h-16h: Après-midi\nAmphi B",
            day(),
            &[],
            &Vocabulary::default(),
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Matin");
        assert_eq!(events[0].description, "13h-16h: Après-midi\nAmphi B");
        assert_eq!(events[1].title, "Après-midi");
        assert_eq!(events[1].description, "9h-12h: Matin\nAmphi B");
    }

    #[test]
    fn test_title_falls_back_to_description_then_placeholder() {
        let events = parse_cell("9h-12h\nSéminaire", day(), &[], &Vocabulary::default());
        assert_eq!(events[0].title, "Séminaire");

        let events = parse_cell("9h-12h", day(), &[], &Vocabulary::default());
        assert_eq!(events[0].title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_only_first_instructor_kept() {
        let events = parse_cell(
            "9h-12h: TD\nMarie Dupont\nJean Martin\nsalle 4",
            day(),
            &[],
            &Vocabulary::default(),
        );
        assert_eq!(events[0].title, "TD - Marie Dupont");
        assert_eq!(events[0].description, "Marie Dupont\nsalle 4");
    }

    #[test]
    fn test_allow_listed_name() {
        let vocab = Vocabulary::new(vec!["Mohammed".to_string()]);
        assert!(vocab.is_instructor_line("avec Mohammed B."));
        assert!(vocab.is_instructor_line("Anne Leroy"));
        assert!(!vocab.is_instructor_line("Salle B"));
        assert!(!vocab.is_instructor_line("Projets collaboratifs"));
    }

    #[test]
    fn test_all_day_fallback() {
        let text = "Projets collaboratifs\nSalle B";
        let blocks = split_blocks(text);
        assert_eq!(
            classify_block(&blocks[0], &Vocabulary::default()),
            BlockShape::AllDayFallback
        );

        let events = parse_cell(text, day(), &[], &Vocabulary::default());
        assert_eq!(events.len(), 1);
        assert!(events[0].is_all_day());
        assert_eq!(events[0].when, EventWhen::AllDay(day()));
        assert_eq!(events[0].title, "Projets collaboratifs");
        assert_eq!(events[0].description, "Salle B");
    }

    #[test]
    fn test_partial_cancellation_keeps_other_blocks() {
        let cancelled = vec![CancelledEntry::partial(day(), "Atelier")];
        let events = parse_cell(
            "9h-12h: Atelier\n\n14h-17h: Projet",
            day(),
            &cancelled,
            &Vocabulary::default(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Projet");
    }

    #[test]
    fn test_partial_cancellation_other_date_ignored() {
        let other = CalendarDate::new(2025, 10, 7).unwrap();
        let cancelled = vec![CancelledEntry::partial(other, "Atelier")];
        let events = parse_cell("9h-12h: Atelier", day(), &cancelled, &Vocabulary::default());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_partial_cancellation_by_range_text() {
        let cancelled = vec![CancelledEntry::partial(day(), "14h-17h")];
        let events = parse_cell(
            "9h-12h: Atelier\n\n14h - 17h: Projet",
            day(),
            &cancelled,
            &Vocabulary::default(),
        );
        // "14h-17h" is not a substring of "14h - 17h: Projet" but equals the
        // normalized range.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Atelier");
    }

    #[test]
    fn test_partial_cancellation_is_case_sensitive() {
        let cancelled = vec![CancelledEntry::partial(day(), "atelier")];
        let events = parse_cell("9h-12h: Atelier", day(), &cancelled, &Vocabulary::default());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_partial_cancellation_drops_all_day_block() {
        let cancelled = vec![CancelledEntry::partial(day(), "collaboratifs")];
        let events = parse_cell(
            "Projets collaboratifs\nSalle B\n\nRéunion",
            day(),
            &cancelled,
            &Vocabulary::default(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Réunion");
    }

    #[test]
    fn test_unparseable_time_only_skips_sub_event() {
        // The time regex only admits digits, so build the slots by hand.
        let block = Block {
            raw: "xh-12h: A",
            lines: vec!["xh-12h: A"],
        };
        let slots = vec![
            TimeSlot {
                line: "xh-12h: A",
                start_token: "xh",
                end_token: "12h",
                title_guess: "A",
            },
            TimeSlot {
                line: "9h-10h: B",
                start_token: "9h",
                end_token: "10h",
                title_guess: "B",
            },
        ];
        let mut out = Vec::new();
        timed_events(&block, &slots, None, &[], day(), &[], &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "B");
    }
}
