//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing and calendar arithmetic so the engine enforces consistent
//! invariants.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Sum of `values`, or a validation error on `field` when it overflows.
pub(crate) fn checked_total(
    values: impl IntoIterator<Item = i64>,
    field: &str,
) -> ResultEngine<i64> {
    values
        .into_iter()
        .try_fold(0i64, |total, value| total.checked_add(value))
        .ok_or_else(|| EngineError::invalid(field, "total is out of range"))
}

/// Validate a `(year, month)` pair and return the first day of that month.
pub(crate) fn first_day_of_month(year: i32, month: u32) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::invalid("month", format!("invalid month {year}-{month}")))
}

/// Last calendar day of `(year, month)`.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> ResultEngine<NaiveDate> {
    first_day_of_month(year, month)?;
    let (next_year, next_month) = next_month(year, month);
    let first_of_next = first_day_of_month(next_year, next_month)?;
    first_of_next
        .pred_opt()
        .ok_or_else(|| EngineError::invalid("month", format!("invalid month {year}-{month}")))
}

/// The month before `(year, month)`; January wraps to December of the prior
/// year.
pub(crate) fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Last instant (23:59:59 UTC) of `(year, month)`.
pub(crate) fn end_of_month(year: i32, month: u32) -> ResultEngine<DateTime<Utc>> {
    let last_day = last_day_of_month(year, month)?;
    let time = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| EngineError::invalid("month", "invalid end of month"))?;
    Ok(Utc.from_utc_datetime(&last_day.and_time(time)))
}

/// The `count` months ending at `(year, month)`, oldest first.
pub(crate) fn trailing_months(year: i32, month: u32, count: u32) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(count as usize);
    let mut cursor = (year, month);
    for _ in 0..count {
        months.push(cursor);
        cursor = previous_month(cursor.0, cursor.1);
    }
    months.reverse();
    months
}
