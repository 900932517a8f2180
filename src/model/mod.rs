// File: ./src/model/mod.rs
pub mod adapter;
pub mod cancel;
pub mod date;
pub mod event;
pub mod timezone;

pub use adapter::{CalendarMeta, ScheduleCalendar};
pub use cancel::{CancelSource, CancelledEntry, Cancellations, WholeCancellations};
pub use date::{
    AcademicYear, CalendarDate, all_day_months, contains_day_month, first_day_month,
    parse_date_string,
};
pub use event::{CellEvent, EventWhen, ParsedTime};
