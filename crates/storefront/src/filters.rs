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

/// Returns the content hash for main.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Formats a `YYYY-MM-DD` date the way Chilean shoppers read it.
///
/// Usage in templates: `{{ order.date|fecha }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn fecha(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_fecha(&value.to_string()))
}

/// `2025-03-01...` -> `01/03/2025`; anything else is returned unchanged.
fn format_fecha(raw: &str) -> String {
    let date = raw.get(..10).unwrap_or(raw);
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_or_else(|_| raw.to_string(), |d| d.format("%d/%m/%Y").to_string())
}
