//! Date column labels in the Johns Hopkins `M/D/YY` form.

use chrono::{Datelike, NaiveDate};

use crate::error::{AtlasError, Result};

/// First reported date in the time-series sources.
pub const DATASET_START: (i32, u32, u32) = (2020, 1, 22);

/// Display format used in titles and the slider.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

pub fn dataset_start() -> NaiveDate {
    let (y, m, d) = DATASET_START;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Renders a date as a column label: no leading zeros, two-digit year.
pub fn date_formatter(date: NaiveDate) -> String {
    format!("{}/{}/{:02}", date.month(), date.day(), date.year().rem_euclid(100))
}

/// Converts an `MM/DD/YYYY` string into a column label.
///
/// Leading zeros are stripped from month and day and the year is cut to its
/// last two digits. Input that is not three `/`-separated runs of ASCII
/// digits is returned as is.
pub fn format_label(text: &str) -> String {
    let parts: Vec<&str> = text.trim().split('/').collect();
    let numeric = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if parts.len() != 3 || !parts.iter().all(|p| numeric(p)) {
        return text.to_string();
    }
    let strip = |p: &str| {
        let s = p.trim_start_matches('0');
        if s.is_empty() { "0".to_string() } else { s.to_string() }
    };
    let year = parts[2];
    let short_year = if year.len() > 2 { &year[year.len() - 2..] } else { year };
    format!("{}/{}/{}", strip(parts[0]), strip(parts[1]), short_year)
}

/// Parses an `M/D/YY` label. Two-digit years land in 2000-2099.
pub fn parse_label(label: &str) -> Result<NaiveDate> {
    let invalid = || AtlasError::InvalidDateLabel {
        label: label.to_string(),
    };
    let mut parts = label.trim().split('/');
    let (Some(m), Some(d), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if y.len() != 2 {
        return Err(invalid());
    }
    let month: u32 = m.parse().map_err(|_| invalid())?;
    let day: u32 = d.parse().map_err(|_| invalid())?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(invalid)
}

pub fn is_date_label(label: &str) -> bool {
    parse_label(label).is_ok()
}
