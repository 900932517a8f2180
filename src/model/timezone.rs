// File: src/model/timezone.rs
//! VTIMEZONE definitions for the zones a planning is likely to use.
//!
//! Only zones following the current EU daylight-saving rule are known: last
//! Sunday of March to last Sunday of October, switching at 01:00 UTC.

struct EuRule {
    standard_name: &'static str,
    daylight_name: &'static str,
    /// Standard offset, `+HHMM`.
    standard: &'static str,
    daylight: &'static str,
    /// Local wall-clock time of the spring switch (`HHMMSS`).
    spring_local: &'static str,
    autumn_local: &'static str,
}

const CENTRAL: EuRule = EuRule {
    standard_name: "CET",
    daylight_name: "CEST",
    standard: "+0100",
    daylight: "+0200",
    spring_local: "020000",
    autumn_local: "030000",
};

const WESTERN: EuRule = EuRule {
    standard_name: "WET",
    daylight_name: "WEST",
    standard: "+0000",
    daylight: "+0100",
    spring_local: "010000",
    autumn_local: "020000",
};

const BRITISH: EuRule = EuRule {
    standard_name: "GMT",
    daylight_name: "BST",
    ..WESTERN
};

fn rule_for(tzid: &str) -> Option<&'static EuRule> {
    match tzid {
        "Europe/Paris" | "Europe/Brussels" | "Europe/Luxembourg" | "Europe/Monaco"
        | "Europe/Berlin" | "Europe/Amsterdam" | "Europe/Zurich" | "Europe/Vienna"
        | "Europe/Madrid" | "Europe/Rome" => Some(&CENTRAL),
        "Europe/Lisbon" | "Atlantic/Canary" => Some(&WESTERN),
        "Europe/London" => Some(&BRITISH),
        _ => None,
    }
}

/// The VTIMEZONE component for `tzid`, one content line per entry, or
/// `None` when the zone is unknown.
pub fn vtimezone_lines(tzid: &str) -> Option<Vec<String>> {
    let rule = rule_for(tzid)?;
    Some(vec![
        "BEGIN:VTIMEZONE".to_string(),
        format!("TZID:{}", tzid),
        "BEGIN:DAYLIGHT".to_string(),
        format!("TZOFFSETFROM:{}", rule.standard),
        format!("TZOFFSETTO:{}", rule.daylight),
        format!("TZNAME:{}", rule.daylight_name),
        format!("DTSTART:19700329T{}", rule.spring_local),
        "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU".to_string(),
        "END:DAYLIGHT".to_string(),
        "BEGIN:STANDARD".to_string(),
        format!("TZOFFSETFROM:{}", rule.daylight),
        format!("TZOFFSETTO:{}", rule.standard),
        format!("TZNAME:{}", rule.standard_name),
        format!("DTSTART:19701025T{}", rule.autumn_local),
        "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU".to_string(),
        "END:STANDARD".to_string(),
        "END:VTIMEZONE".to_string(),
    ])
}
