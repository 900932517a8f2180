// Cell and grid parsing through the public API.
use plancal::grid::{self, WalkContext};
use plancal::model::{
    AcademicYear, CalendarDate, CancelledEntry, ParsedTime, WholeCancellations, first_day_month,
    parse_date_string,
};
use plancal::parser::{Vocabulary, parse_cell, parse_time};

const YEAR: AcademicYear = AcademicYear { fall_year: 2025 };

fn day(m: u32, d: u32) -> CalendarDate {
    YEAR.resolve(d, m).unwrap()
}

#[test]
fn test_year_follows_term() {
    assert_eq!(parse_date_string("15/3", YEAR), CalendarDate::new(2026, 3, 15));
    assert_eq!(parse_date_string("20/11", YEAR), CalendarDate::new(2025, 11, 20));

    let resolved = parse_date_string("5/1", YEAR).unwrap();
    let again = first_day_month(&resolved.to_string(), YEAR).unwrap();
    assert_eq!(again, resolved);
}

#[test]
fn test_time_tokens() {
    assert_eq!(parse_time("9h"), Some(ParsedTime::new(9, 0)));
    assert_eq!(parse_time("14h30"), Some(ParsedTime::new(14, 30)));
    assert_eq!(parse_time("09:05"), Some(ParsedTime::new(9, 5)));
    assert_eq!(parse_time("abch"), None);
}

#[test]
fn test_course_with_instructor() {
    let events = parse_cell(
        "9h-12h: Atelier\nMarie Dupont",
        day(10, 6),
        &[],
        &Vocabulary::default(),
    );
    assert_eq!(events.len(), 1);
    let e = &events[0];
    assert_eq!(e.title, "Atelier - Marie Dupont");
    assert_eq!(e.description, "Marie Dupont");
    assert_eq!(e.start(), Some(ParsedTime::new(9, 0)));
    assert_eq!(e.end(), Some(ParsedTime::new(12, 0)));
}

#[test]
fn test_partial_cancellation_keeps_other_blocks() {
    let cell = "9h-12h: Atelier\n\n14h-17h: Anglais";
    let partial = vec![
        CancelledEntry::partial(day(10, 6), "Atelier"),
        CancelledEntry::partial(day(10, 7), "Anglais"),
    ];
    let events = parse_cell(cell, day(10, 6), &partial, &Vocabulary::default());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Anglais");
    assert_eq!(events[0].start(), Some(ParsedTime::new(14, 0)));
}

#[test]
fn test_untimed_block_is_all_day() {
    let events = parse_cell(
        "Projets collaboratifs\nSalle B",
        day(10, 6),
        &[],
        &Vocabulary::default(),
    );
    assert_eq!(events.len(), 1);
    assert!(events[0].is_all_day());
    assert_eq!(events[0].title, "Projets collaboratifs");
    assert_eq!(events[0].description, "Salle B");
}

#[test]
fn test_walk_csv_export() {
    let payload = "Semaine 41,,\n\
        Lundi 6/10,Mardi 7/10,Jeudi 9/10\n\
        \"9h-12h: Atelier\nMarie Dupont\",,\"9h-10h30: Stats\n\n14h-16h: Droit\"\n";
    let grid = grid::parse_csv(payload).unwrap();
    let vocab = Vocabulary::default();
    let whole = WholeCancellations::default();
    let ctx = WalkContext {
        year: YEAR,
        whole: &whole,
        partial: &[],
        vocab: &vocab,
    };

    let events = grid::walk(&grid, &ctx);
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Atelier - Marie Dupont", "Stats", "Droit"]);
    assert_eq!(events[1].date(), day(10, 9));
    assert_eq!(events[1].end(), Some(ParsedTime::new(10, 30)));
}
