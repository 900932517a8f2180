// File: src/model/event.rs
use crate::model::date::CalendarDate;
use std::fmt;

/// Hour and minute as written in the planning. Not range-checked: "25h" is
/// representable and only rejected when the event is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParsedTime {
    pub hour: u32,
    pub minute: u32,
}

impl ParsedTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for ParsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWhen {
    Timed {
        date: CalendarDate,
        start: ParsedTime,
        end: ParsedTime,
    },
    AllDay(CalendarDate),
}

/// One event extracted from a planning cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEvent {
    pub when: EventWhen,
    pub title: String,
    pub description: String,
}

impl CellEvent {
    pub fn timed(
        date: CalendarDate,
        start: ParsedTime,
        end: ParsedTime,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            when: EventWhen::Timed { date, start, end },
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn all_day(
        date: CalendarDate,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            when: EventWhen::AllDay(date),
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn date(&self) -> CalendarDate {
        match self.when {
            EventWhen::Timed { date, .. } => date,
            EventWhen::AllDay(date) => date,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self.when, EventWhen::AllDay(_))
    }

    pub fn start(&self) -> Option<ParsedTime> {
        match self.when {
            EventWhen::Timed { start, .. } => Some(start),
            EventWhen::AllDay(_) => None,
        }
    }

    pub fn end(&self) -> Option<ParsedTime> {
        match self.when {
            EventWhen::Timed { end, .. } => Some(end),
            EventWhen::AllDay(_) => None,
        }
    }
}
