// File: src/parser/time_range.rs
use crate::model::ParsedTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// `9h-12h`, `14h30 - 17h30`, `09:00-10:30`, ...
static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}(?:h|:)(?:\d{2})?)\s*-\s*(\d{1,2}(?:h|:)(?:\d{2})?)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeMatch<'a> {
    pub start_token: &'a str,
    pub end_token: &'a str,
    /// Byte offset in the line just past the end token.
    pub end_offset: usize,
}

impl<'a> TimeRangeMatch<'a> {
    /// Text following the range on its line, with one leading colon removed.
    pub fn title_guess(&self, line: &'a str) -> &'a str {
        let rest = line[self.end_offset..].trim();
        match rest.strip_prefix(':') {
            Some(stripped) => stripped.trim(),
            None => rest,
        }
    }
}

/// All non-overlapping time ranges of a line, left to right.
pub fn time_ranges(line: &str) -> impl Iterator<Item = TimeRangeMatch<'_>> {
    TIME_RANGE.captures_iter(line).filter_map(|caps| {
        let start = caps.get(1)?;
        let end = caps.get(2)?;
        Some(TimeRangeMatch {
            start_token: start.as_str(),
            end_token: end.as_str(),
            end_offset: caps.get(0)?.end(),
        })
    })
}

/// Normalizes `9h`, `14h30`, `09:05` to hour/minute. Fails when either part
/// is not a number; does not check ranges.
pub fn parse_time(token: &str) -> Option<ParsedTime> {
    let normalized = token.trim().to_lowercase().replace(':', "h");
    let mut parts = normalized.split('h');
    let hour_part = parts.next()?;
    if hour_part.is_empty() || !hour_part.chars().all(|c| c.is_ascii_digit()) {
        log::warn!("Cannot parse time token: {}", token);
        return None;
    }
    let hour = hour_part.parse::<u32>().ok()?;
    let minute = match parts.next() {
        None | Some("") => 0,
        Some(m) => match m.parse::<u32>() {
            Ok(m) => m,
            Err(_) => {
                log::warn!("Cannot parse time token: {}", token);
                return None;
            }
        },
    };
    Some(ParsedTime::new(hour, minute))
}
