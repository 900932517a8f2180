// File: src/model/cancel.rs
use crate::model::date::CalendarDate;
use std::collections::BTreeSet;
use std::fmt;

/// Struck text inside a cell: only the sub-event matching `content` on
/// `date` is dropped. Whole-day cancellations are plain dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CancelledEntry {
    pub date: CalendarDate,
    pub content: String,
}

impl CancelledEntry {
    pub fn partial(date: CalendarDate, content: impl Into<String>) -> Self {
        Self {
            date,
            content: content.into(),
        }
    }

    /// The text to look for, or `None` if the entry cannot match anything.
    pub fn needle(&self) -> Option<&str> {
        let trimmed = self.content.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Cancellations detected in the markup of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cancellations {
    pub whole: BTreeSet<CalendarDate>,
    pub partial: Vec<CancelledEntry>,
}

impl Cancellations {
    pub fn is_empty(&self) -> bool {
        self.whole.is_empty() && self.partial.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSource {
    Manual,
    Markup,
}

impl fmt::Display for CancelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelSource::Manual => write!(f, "manual list"),
            CancelSource::Markup => write!(f, "strikethrough in markup"),
        }
    }
}

/// Union of manually listed and markup-detected whole-day cancellations,
/// remembering where each came from for logging.
#[derive(Debug, Clone, Default)]
pub struct WholeCancellations {
    pub manual: BTreeSet<CalendarDate>,
    pub detected: BTreeSet<CalendarDate>,
}

impl WholeCancellations {
    pub fn new(manual: BTreeSet<CalendarDate>, detected: BTreeSet<CalendarDate>) -> Self {
        Self { manual, detected }
    }

    /// Markup detection takes precedence when a date is in both sets.
    pub fn source(&self, date: &CalendarDate) -> Option<CancelSource> {
        if self.detected.contains(date) {
            Some(CancelSource::Markup)
        } else if self.manual.contains(date) {
            Some(CancelSource::Manual)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.manual.union(&self.detected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.detected.is_empty()
    }
}
