//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Day/month/year for a date or timestamp.
///
/// Usage in templates: `{{ order.date|fecha }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn fecha(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    let date = raw.get(..10).unwrap_or(&raw);
    Ok(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_or(raw.clone(), |d| d.format("%d/%m/%Y").to_string()))
}
