// File: src/model/adapter.rs
use crate::model::date::CalendarDate;
use crate::model::event::{CellEvent, EventWhen, ParsedTime};
use crate::model::timezone::vtimezone_lines;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use icalendar::{Calendar, Component, Event, Property};
use uuid::Uuid;

const UTC_STAMP: &str = "%Y%m%dT%H%M%SZ";
const LOCAL_STAMP: &str = "%Y%m%dT%H%M%S";
const DATE_ONLY: &str = "%Y%m%d";

fn local_instant(date: CalendarDate, time: ParsedTime) -> Option<NaiveDateTime> {
    let day = date.to_naive()?;
    let clock = NaiveTime::from_hms_opt(time.hour, time.minute, 0)?;
    Some(day.and_time(clock))
}

fn zoned_property(key: &str, at: NaiveDateTime, tzid: &str) -> Property {
    let mut prop = Property::new(key, at.format(LOCAL_STAMP).to_string());
    prop.add_parameter("TZID", tzid);
    prop
}

fn date_property(key: &str, day: NaiveDate) -> Property {
    let mut prop = Property::new(key, day.format(DATE_ONLY).to_string());
    prop.add_parameter("VALUE", "DATE");
    prop
}

/// Escapes a TEXT value (RFC 5545 §3.3.11) for lines written by hand.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

impl CellEvent {
    /// Builds the iCalendar event. Timed events carry local wall-clock times
    /// tagged with `tzid`; all-day events are date-only so no timezone can
    /// shift them to the previous day. Returns `None` when the date or the
    /// time does not exist (31/02, 25h...).
    pub fn to_ical_event(&self, tzid: &str, generated_at: DateTime<Utc>) -> Option<Event> {
        let mut event = Event::new();
        event.uid(&Uuid::new_v4().to_string());
        event.summary(&self.title);
        if !self.description.is_empty() {
            event.description(&self.description);
        }
        event.timestamp(generated_at);
        let stamp = generated_at.format(UTC_STAMP).to_string();
        event.add_property("CREATED", &stamp);
        event.add_property("LAST-MODIFIED", &stamp);

        match self.when {
            EventWhen::Timed { date, start, end } => {
                let (Some(begin), Some(finish)) =
                    (local_instant(date, start), local_instant(date, end))
                else {
                    log::warn!(
                        "Dropping '{}': {} {}-{} is not a valid time",
                        self.title,
                        date,
                        start,
                        end
                    );
                    return None;
                };
                event.append_property(zoned_property("DTSTART", begin, tzid));
                event.append_property(zoned_property("DTEND", finish, tzid));
            }
            EventWhen::AllDay(date) => {
                let Some(day) = date.to_naive() else {
                    log::warn!("Dropping '{}': {} does not exist", self.title, date);
                    return None;
                };
                let next = day.succ_opt()?;
                event.append_property(date_property("DTSTART", day));
                event.append_property(date_property("DTEND", next));
            }
        }

        Some(event.done())
    }
}

/// Feed-level properties written right after `BEGIN:VCALENDAR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    pub name: String,
    pub description: String,
    pub timezone: String,
    /// 0 disables REFRESH-INTERVAL.
    pub refresh_interval_hours: u32,
    /// 0 disables X-PUBLISHED-TTL.
    pub publish_ttl_hours: u32,
}

impl CalendarMeta {
    fn header_lines(&self) -> Vec<String> {
        let mut lines = vec!["METHOD:PUBLISH".to_string()];
        if self.refresh_interval_hours > 0 {
            lines.push(format!(
                "REFRESH-INTERVAL;VALUE=DURATION:PT{}H",
                self.refresh_interval_hours
            ));
        }
        if self.publish_ttl_hours > 0 {
            lines.push(format!("X-PUBLISHED-TTL:PT{}H", self.publish_ttl_hours));
        }
        lines.push(format!("X-WR-CALNAME:{}", escape_text(&self.name)));
        lines.push(format!("X-WR-CALDESC:{}", escape_text(&self.description)));
        lines.push(format!("X-WR-TIMEZONE:{}", self.timezone));
        lines
    }
}

/// The output calendar being accumulated over all sources.
pub struct ScheduleCalendar {
    meta: CalendarMeta,
    generated_at: DateTime<Utc>,
    calendar: Calendar,
    count: usize,
    /// Whether any event refers to the TZID, so VTIMEZONE is needed.
    zoned: bool,
}

impl ScheduleCalendar {
    pub fn new(meta: CalendarMeta, generated_at: DateTime<Utc>) -> Self {
        Self {
            meta,
            generated_at,
            calendar: Calendar::new(),
            count: 0,
            zoned: false,
        }
    }

    /// Adds an event; returns false if it could not be rendered.
    pub fn push(&mut self, event: &CellEvent) -> bool {
        match event.to_ical_event(&self.meta.timezone, self.generated_at) {
            Some(ical) => {
                self.calendar.push(ical);
                self.count += 1;
                self.zoned |= !event.is_all_day();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn to_ics(&self) -> String {
        let ics = self.calendar.to_string();
        let with_header = insert_after_line(&ics, "BEGIN:VCALENDAR", &self.meta.header_lines());
        if !self.zoned {
            return with_header;
        }

        match vtimezone_lines(&self.meta.timezone) {
            // Components must follow VERSION/PRODID, so go before the first event.
            Some(tz) => insert_before_line(&with_header, "BEGIN:VEVENT", &tz),
            None => {
                log::warn!(
                    "No VTIMEZONE known for {}, clients will rely on the TZID name",
                    self.meta.timezone
                );
                with_header
            }
        }
    }
}

fn push_lines(buffer: &mut String, lines: &[String]) {
    for line in lines {
        buffer.push_str(line);
        buffer.push_str("\r\n");
    }
}

/// Inserts `lines` right after the first line starting with `marker`.
fn insert_after_line(ics: &str, marker: &str, lines: &[String]) -> String {
    let Some(idx) = ics.find(marker) else {
        return ics.to_string();
    };
    // Keep whatever line ending the serializer used.
    let line_end = ics[idx + marker.len()..]
        .find('\n')
        .map(|n| idx + marker.len() + n + 1)
        .unwrap_or(ics.len());

    let mut buffer = String::with_capacity(ics.len() + lines.len() * 40);
    buffer.push_str(&ics[..line_end]);
    if !buffer.ends_with('\n') {
        buffer.push_str("\r\n");
    }
    push_lines(&mut buffer, lines);
    buffer.push_str(&ics[line_end..]);
    buffer
}

/// Inserts `lines` right before the first line starting with `marker`.
fn insert_before_line(ics: &str, marker: &str, lines: &[String]) -> String {
    let Some(idx) = ics.find(marker) else {
        return ics.to_string();
    };
    let mut buffer = String::with_capacity(ics.len() + lines.len() * 40);
    buffer.push_str(&ics[..idx]);
    push_lines(&mut buffer, lines);
    buffer.push_str(&ics[idx..]);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta() -> CalendarMeta {
        CalendarMeta {
            name: "Planning M2".to_string(),
            description: "Cours, TD, ateliers".to_string(),
            timezone: "Europe/Paris".to_string(),
            refresh_interval_hours: 1,
            publish_ttl_hours: 2,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 6, 8, 30, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(2025, m, d).unwrap()
    }

    #[test]
    fn test_timed_event_is_zoned() {
        let e = CellEvent::timed(
            day(10, 6),
            ParsedTime::new(9, 0),
            ParsedTime::new(12, 30),
            "Atelier",
            "Marie Dupont",
        );
        let mut cal = ScheduleCalendar::new(meta(), now());
        assert!(cal.push(&e));
        let ics = cal.to_ics();
        assert!(ics.contains("DTSTART;TZID=Europe/Paris:20251006T090000"));
        assert!(ics.contains("DTEND;TZID=Europe/Paris:20251006T123000"));
        assert!(ics.contains("SUMMARY:Atelier"));
        assert!(ics.contains("DESCRIPTION:Marie Dupont"));
        assert!(ics.contains("CREATED:20251006T083000Z"));
        assert!(ics.contains("LAST-MODIFIED:20251006T083000Z"));
    }

    #[test]
    fn test_timed_events_get_vtimezone() {
        let e = CellEvent::timed(
            day(10, 6),
            ParsedTime::new(9, 0),
            ParsedTime::new(12, 0),
            "Atelier",
            "",
        );
        let mut cal = ScheduleCalendar::new(meta(), now());
        cal.push(&e);
        cal.push(&e);
        let ics = cal.to_ics();

        assert_eq!(ics.matches("BEGIN:VTIMEZONE").count(), 1);
        let version = ics.find("VERSION:2.0").unwrap();
        let tz = ics.find("BEGIN:VTIMEZONE").unwrap();
        let event = ics.find("BEGIN:VEVENT").unwrap();
        assert!(version < tz && tz < event);
        assert!(ics.contains("TZID:Europe/Paris\r\n"));
        assert!(ics.contains("END:VTIMEZONE\r\nBEGIN:VEVENT"));
    }

    #[test]
    fn test_unknown_zone_has_no_vtimezone() {
        let mut m = meta();
        m.timezone = "America/Cayenne".to_string();
        let e = CellEvent::timed(
            day(10, 6),
            ParsedTime::new(9, 0),
            ParsedTime::new(12, 0),
            "Atelier",
            "",
        );
        let mut cal = ScheduleCalendar::new(m, now());
        cal.push(&e);
        let ics = cal.to_ics();
        assert!(ics.contains("DTSTART;TZID=America/Cayenne:20251006T090000"));
        assert!(!ics.contains("VTIMEZONE"));
    }

    #[test]
    fn test_all_day_event_is_date_only() {
        let e = CellEvent::all_day(day(12, 31), "Projets collaboratifs", "Salle B");
        let mut cal = ScheduleCalendar::new(meta(), now());
        assert!(cal.push(&e));
        let ics = cal.to_ics();
        assert!(ics.contains("DTSTART;VALUE=DATE:20251231"));
        assert!(ics.contains("DTEND;VALUE=DATE:20260101"));
        assert!(!ics.contains("TZID"));
    }

    #[test]
    fn test_invalid_times_rejected() {
        let e = CellEvent::timed(
            day(10, 6),
            ParsedTime::new(25, 0),
            ParsedTime::new(26, 0),
            "Nuit",
            "",
        );
        assert!(e.to_ical_event("Europe/Paris", now()).is_none());

        let feb = CellEvent::all_day(CalendarDate::new(2026, 2, 30).unwrap(), "X", "");
        let mut cal = ScheduleCalendar::new(meta(), now());
        assert!(!cal.push(&feb));
        assert!(cal.is_empty());
    }

    #[test]
    fn test_header_injection() {
        let cal = ScheduleCalendar::new(meta(), now());
        let ics = cal.to_ics();
        let begin = ics.find("BEGIN:VCALENDAR").unwrap();
        let method = ics.find("METHOD:PUBLISH").unwrap();
        assert!(method > begin);
        assert!(ics.contains("REFRESH-INTERVAL;VALUE=DURATION:PT1H\r\n"));
        assert!(ics.contains("X-PUBLISHED-TTL:PT2H\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Planning M2\r\n"));
        assert!(ics.contains("X-WR-CALDESC:Cours\\, TD\\, ateliers\r\n"));
        assert!(ics.contains("X-WR-TIMEZONE:Europe/Paris\r\n"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn test_refresh_disabled() {
        let mut m = meta();
        m.refresh_interval_hours = 0;
        m.publish_ttl_hours = 0;
        let ics = ScheduleCalendar::new(m, now()).to_ics();
        assert!(!ics.contains("REFRESH-INTERVAL"));
        assert!(!ics.contains("X-PUBLISHED-TTL"));
    }
}
