use crate::error::{PulseError, PulseResult};
use crate::models::dashboard::MonthSelection;
use crate::models::snapshot::RawSnapshot;
use chrono::{Month, Months, NaiveDate};

const ISO_DATE: &str = "%Y-%m-%d";

/// First and last calendar day of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub month: Month,
    pub year: i32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl MonthRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }

    pub fn to_selection(&self) -> MonthSelection {
        MonthSelection {
            month: self.month.name().to_string(),
            year: self.year,
            first_day: self.first_day.format(ISO_DATE).to_string(),
            last_day: self.last_day.format(ISO_DATE).to_string(),
        }
    }
}

/// Resolve a full month name ("February", case-insensitive) and year into
/// its calendar range. Abbreviations such as "Feb" are rejected.
pub fn month_range(month_name: &str, year: i32) -> PulseResult<MonthRange> {
    let name = month_name.trim();
    let month = name
        .parse::<Month>()
        .ok()
        .filter(|month| month.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| PulseError::invalid_period(format!("'{month_name}' is not a month name")))?;

    let first_day = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
        .ok_or_else(|| PulseError::invalid_period(format!("year {year} is out of range")))?;
    let last_day = first_day
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| PulseError::invalid_period(format!("year {year} is out of range")))?;

    Ok(MonthRange {
        month,
        year,
        first_day,
        last_day,
    })
}

/// Parse a month-selector label such as "January 2024" into ISO first/last days.
pub fn month_date_range(label: &str) -> PulseResult<(String, String)> {
    let invalid = || PulseError::invalid_period(format!("'{label}' is not a 'Month YYYY' label"));

    let mut parts = label.split_whitespace();
    let (Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;

    let range = month_range(month, year)?;
    let selection = range.to_selection();
    Ok((selection.first_day, selection.last_day))
}

/// Restrict a snapshot to the dates inside one calendar month, keeping
/// `categories` untouched. Date keys that are not ISO dates never fall inside
/// a month and are dropped. Check [`RawSnapshot::has_dates`] on the result to
/// detect an empty period.
pub fn filter_by_month(raw: &RawSnapshot, month_name: &str, year: i32) -> PulseResult<RawSnapshot> {
    let range = month_range(month_name, year)?;
    Ok(filter_by_range(raw, &range))
}

pub fn filter_by_range(raw: &RawSnapshot, range: &MonthRange) -> RawSnapshot {
    raw.retain_dates(|date| {
        NaiveDate::parse_from_str(date, ISO_DATE)
            .map(|date| range.contains(date))
            .unwrap_or(false)
    })
}
