//! Statement-date parsing with a today fallback.

use chrono::{Datelike, Local, NaiveDate};

// %y before %Y: chrono's %Y happily reads "24" as the year 24.
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];

/// Best-effort parse of the date formats seen across bank exports.
pub fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    // Year-less MM/DD rows (PDF layouts): complete with the current year.
    let mut parts = raw.split('/');
    if let (Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next()) {
        let month: u32 = m.trim().parse().ok()?;
        let day: u32 = d.trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(Local::now().year(), month, day);
    }
    None
}

/// Parse a date or fall back to today. Date problems never fail a parse.
pub fn parse_date_or_today(raw: &str) -> NaiveDate {
    parse_statement_date(raw).unwrap_or_else(|| Local::now().date_naive())
}
