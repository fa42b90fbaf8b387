//! Locale-aware rendering of dates, numbers, currencies, percentages,
//! relative times and lists, backed by ICU4X and its compiled CLDR data.
//!
//! Every public entry point falls back to a fixed, locale-agnostic rendering
//! when the locale tag is invalid or the value cannot be rendered. Callers
//! never see an error. Well-formed locales without CLDR data of their own get
//! the root locale's conventions. Dates and times render as UTC wall time.

use chrono::{DateTime, Datelike, Timelike, Utc};
use fixed_decimal::{Decimal, FloatPrecision};
use icu::{
    calendar::{Date, Iso},
    datetime::{
        fieldsets::{
            self,
            enums::{DateAndTimeFieldSet, DateFieldSet, TimeFieldSet},
        },
        input::{self, Time},
        options::Length,
        DateTimeFormatter,
    },
    decimal::{options::DecimalFormatterOptions, DecimalFormatter},
    list::{
        options::{ListFormatterOptions, ListLength},
        ListFormatter,
    },
    locale::Locale,
};
use icu_experimental::relativetime::{RelativeTimeFormatter, RelativeTimeFormatterOptions};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use writeable::Writeable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    Short,
    #[default]
    Medium,
    Long,
    /// Long date with the weekday
    Full,
}

impl DateStyle {
    fn length(self) -> Length {
        match self {
            DateStyle::Short => Length::Short,
            DateStyle::Medium => Length::Medium,
            DateStyle::Long | DateStyle::Full => Length::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// "a, b and c"
    #[default]
    Conjunction,
    /// "a, b or c"
    Disjunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl RelativeUnit {
    fn as_str(self) -> &'static str {
        match self {
            RelativeUnit::Second => "second",
            RelativeUnit::Minute => "minute",
            RelativeUnit::Hour => "hour",
            RelativeUnit::Day => "day",
            RelativeUnit::Week => "week",
            RelativeUnit::Month => "month",
            RelativeUnit::Year => "year",
        }
    }
}

/// A value paired with the kind of formatting it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    Date(DateTime<Utc>, DateStyle),
    Time(DateTime<Utc>),
    DateTime(DateTime<Utc>, DateStyle),
    RelativeTime(i64, RelativeUnit),
    Number(f64, Option<usize>),
    Currency(f64, String),
    Percent(f64, usize),
    List(Vec<String>, ListStyle),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid locale tag: {0}")]
    InvalidLocale(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Value is not a finite number")]
    NonFinite,

    #[error("Date or time out of range")]
    InvalidDate,

    #[error("Formatting data unavailable: {0}")]
    Data(String),
}

fn data_error(e: impl Display) -> FormatError {
    FormatError::Data(e.to_string())
}

/// Upper bound on requested fraction digits.
const MAX_FRACTION_DIGITS: usize = 20;

/// ISO 4217 currencies without minor units.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["CLP", "ISK", "JPY", "KRW", "VND"];

/// Formats values for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFormatter {
    locale: String,
}

impl LocaleFormatter {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Formats `value`, falling back to a fixed rendering on any failure.
    pub fn format(&self, value: &FormatValue) -> String {
        self.try_format(value).unwrap_or_else(|e| {
            tracing::debug!(locale = %self.locale, error = %e, "Using fallback formatting");
            fallback(value)
        })
    }

    /// Formats `value` with the locale's CLDR conventions.
    pub fn try_format(&self, value: &FormatValue) -> Result<String, FormatError> {
        let locale: Locale = self
            .locale
            .trim()
            .parse()
            .map_err(|_| FormatError::InvalidLocale(self.locale.clone()))?;

        match value {
            FormatValue::Date(value, style) => {
                let fieldset = match style {
                    DateStyle::Full => DateFieldSet::YMDE(fieldsets::YMDE::for_length(Length::Long)),
                    _ => DateFieldSet::YMD(fieldsets::YMD::for_length(style.length())),
                };
                let formatter = DateTimeFormatter::<DateFieldSet>::try_new(locale.into(), fieldset)
                    .map_err(data_error)?;
                Ok(formatter.format(&to_icu_date(value)?).to_string())
            }
            FormatValue::Time(value) => {
                let fieldset = TimeFieldSet::T(fieldsets::T::hm().with_length(Length::Short));
                let formatter = DateTimeFormatter::<TimeFieldSet>::try_new(locale.into(), fieldset)
                    .map_err(data_error)?;
                Ok(formatter.format(&to_icu_time(value)?).to_string())
            }
            FormatValue::DateTime(value, style) => {
                let fieldset = DateAndTimeFieldSet::YMDT(
                    fieldsets::YMD::for_length(style.length()).with_time_hm(),
                );
                let formatter =
                    DateTimeFormatter::<DateAndTimeFieldSet>::try_new(locale.into(), fieldset)
                        .map_err(data_error)?;
                let datetime = input::DateTime {
                    date: to_icu_date(value)?,
                    time: to_icu_time(value)?,
                };
                Ok(formatter.format(&datetime).to_string())
            }
            FormatValue::RelativeTime(amount, unit) => {
                let options = RelativeTimeFormatterOptions::default();
                let prefs = locale.into();
                let formatter = match unit {
                    RelativeUnit::Second => RelativeTimeFormatter::try_new_long_second(prefs, options),
                    RelativeUnit::Minute => RelativeTimeFormatter::try_new_long_minute(prefs, options),
                    RelativeUnit::Hour => RelativeTimeFormatter::try_new_long_hour(prefs, options),
                    RelativeUnit::Day => RelativeTimeFormatter::try_new_long_day(prefs, options),
                    RelativeUnit::Week => RelativeTimeFormatter::try_new_long_week(prefs, options),
                    RelativeUnit::Month => RelativeTimeFormatter::try_new_long_month(prefs, options),
                    RelativeUnit::Year => RelativeTimeFormatter::try_new_long_year(prefs, options),
                }
                .map_err(data_error)?;
                Ok(formatter
                    .format(Decimal::from(*amount))
                    .write_to_string()
                    .into_owned())
            }
            FormatValue::Number(number, decimals) => {
                format_decimal(&locale, &to_decimal(*number, *decimals)?)
            }
            FormatValue::Currency(amount, code) => {
                let code = validate_currency(code)?;
                let digits = if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) { 0 } else { 2 };
                let number = format_decimal(&locale, &to_decimal(*amount, Some(digits))?)?;
                Ok(format!("{code}\u{a0}{number}"))
            }
            FormatValue::Percent(ratio, decimals) => {
                let number = format_decimal(&locale, &to_decimal(ratio * 100.0, Some(*decimals))?)?;
                Ok(format!("{number}%"))
            }
            FormatValue::List(items, style) => {
                let options = ListFormatterOptions::default().with_length(ListLength::Wide);
                let formatter = match style {
                    ListStyle::Conjunction => ListFormatter::try_new_and(locale.into(), options),
                    ListStyle::Disjunction => ListFormatter::try_new_or(locale.into(), options),
                }
                .map_err(data_error)?;
                Ok(formatter
                    .format(items.iter().map(String::as_str))
                    .write_to_string()
                    .into_owned())
            }
        }
    }

    pub fn date(&self, value: DateTime<Utc>, style: DateStyle) -> String {
        self.format(&FormatValue::Date(value, style))
    }

    pub fn time(&self, value: DateTime<Utc>) -> String {
        self.format(&FormatValue::Time(value))
    }

    pub fn datetime(&self, value: DateTime<Utc>, style: DateStyle) -> String {
        self.format(&FormatValue::DateTime(value, style))
    }

    pub fn relative_time(&self, amount: i64, unit: RelativeUnit) -> String {
        self.format(&FormatValue::RelativeTime(amount, unit))
    }

    pub fn number(&self, value: f64, decimals: Option<usize>) -> String {
        self.format(&FormatValue::Number(value, decimals))
    }

    pub fn currency(&self, value: f64, code: &str) -> String {
        self.format(&FormatValue::Currency(value, code.to_string()))
    }

    pub fn percent(&self, ratio: f64, decimals: usize) -> String {
        self.format(&FormatValue::Percent(ratio, decimals))
    }

    pub fn list<S: AsRef<str>>(&self, items: &[S], style: ListStyle) -> String {
        let items = items.iter().map(|s| s.as_ref().to_string()).collect();
        self.format(&FormatValue::List(items, style))
    }
}

fn to_icu_date(value: &DateTime<Utc>) -> Result<Date<Iso>, FormatError> {
    Date::try_new_iso(value.year(), value.month() as u8, value.day() as u8)
        .map_err(|_| FormatError::InvalidDate)
}

fn to_icu_time(value: &DateTime<Utc>) -> Result<Time, FormatError> {
    Time::try_new(
        value.hour() as u8,
        value.minute() as u8,
        value.second() as u8,
        value.nanosecond(),
    )
    .map_err(|_| FormatError::InvalidDate)
}

/// Exactly `decimals` fraction digits when given, otherwise at most three
/// with trailing zeros dropped.
fn to_decimal(value: f64, decimals: Option<usize>) -> Result<Decimal, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::NonFinite);
    }
    let mut decimal = Decimal::try_from_f64(value, FloatPrecision::RoundTrip)
        .map_err(|_| FormatError::NonFinite)?;

    match decimals {
        Some(digits) => {
            let position = -(digits.min(MAX_FRACTION_DIGITS) as i16);
            decimal.round(position);
            decimal.pad_end(position);
        }
        None => {
            if *decimal.magnitude_range().start() < -3 {
                decimal.round(-3);
            }
            decimal.trim_end();
        }
    }
    Ok(decimal)
}

fn format_decimal(locale: &Locale, decimal: &Decimal) -> Result<String, FormatError> {
    let formatter = DecimalFormatter::try_new(locale.clone().into(), DecimalFormatterOptions::default())
        .map_err(data_error)?;
    Ok(formatter.format(decimal).to_string())
}

fn validate_currency(code: &str) -> Result<String, FormatError> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(FormatError::InvalidCurrency(code.to_string()))
    }
}

fn join_list(items: &[String], word: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {word} {last}", init.join(", ")),
    }
}

/// Locale-agnostic rendering used whenever locale-aware formatting fails.
pub fn fallback(value: &FormatValue) -> String {
    match value {
        FormatValue::Date(date, _) => date.format("%Y-%m-%d").to_string(),
        FormatValue::Time(date) => date.format("%H:%M:%S").to_string(),
        FormatValue::DateTime(date, _) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
        FormatValue::RelativeTime(amount, unit) => {
            let count = amount.unsigned_abs();
            let plural = if count == 1 { "" } else { "s" };
            let unit = unit.as_str();
            if *amount < 0 {
                format!("{count} {unit}{plural} ago")
            } else {
                format!("in {count} {unit}{plural}")
            }
        }
        FormatValue::Number(number, Some(decimals)) => format!("{:.*}", decimals, number),
        FormatValue::Number(number, None) => number.to_string(),
        FormatValue::Currency(amount, code) => format!("{} {:.2}", code, amount),
        FormatValue::Percent(ratio, decimals) => format!("{:.*}%", decimals, ratio * 100.0),
        FormatValue::List(items, ListStyle::Conjunction) => join_list(items, "and"),
        FormatValue::List(items, ListStyle::Disjunction) => join_list(items, "or"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_number_grouping_per_locale() {
        assert_eq!(LocaleFormatter::new("en").number(1234567.891, None), "1,234,567.891");
        assert_eq!(LocaleFormatter::new("de").number(1234567.891, Some(2)), "1.234.567,89");
        assert_eq!(LocaleFormatter::new("pt-BR").number(-1234.5, None), "-1.234,5");
        assert_eq!(LocaleFormatter::new("en").number(999.0, None), "999");
        assert_eq!(LocaleFormatter::new("en").number(1.5, Some(2)), "1.50");
        assert_eq!(LocaleFormatter::new("en").number(0.123456, None), "0.123");
    }

    #[test]
    fn test_dutch_and_root_locales_use_cldr_data() {
        let nl = LocaleFormatter::new("nl");
        assert_eq!(nl.number(1234.5, None), "1.234,5");
        assert_eq!(nl.list(&["a", "b", "c"], ListStyle::Conjunction), "a, b en c");

        let unknown = LocaleFormatter::new("xx");
        assert!(unknown.try_format(&FormatValue::Number(1234.5, None)).is_ok());
    }

    #[test]
    fn test_currency() {
        assert_eq!(LocaleFormatter::new("en-US").currency(1234.5, "usd"), "USD\u{a0}1,234.50");
        assert_eq!(LocaleFormatter::new("de").currency(99.99, "EUR"), "EUR\u{a0}99,99");
        assert_eq!(LocaleFormatter::new("en").currency(1500.0, "JPY"), "JPY\u{a0}1,500");
    }

    #[test]
    fn test_percent() {
        assert_eq!(LocaleFormatter::new("en").percent(0.5, 0), "50%");
        assert_eq!(LocaleFormatter::new("de").percent(0.125, 1), "12,5%");
    }

    #[test]
    fn test_lists() {
        let items = ["a", "b", "c"];
        assert_eq!(LocaleFormatter::new("en").list(&items, ListStyle::Conjunction), "a, b, and c");
        assert_eq!(LocaleFormatter::new("pt").list(&items, ListStyle::Disjunction), "a, b ou c");
        assert_eq!(LocaleFormatter::new("es").list(&["x", "y"], ListStyle::Conjunction), "x y y");
        assert_eq!(LocaleFormatter::new("en").list(&["solo"], ListStyle::Conjunction), "solo");
    }

    #[test]
    fn test_relative_time() {
        let en = LocaleFormatter::new("en");
        assert_eq!(en.relative_time(3, RelativeUnit::Day), "in 3 days");
        assert_eq!(en.relative_time(-1, RelativeUnit::Hour), "1 hour ago");
        assert_eq!(LocaleFormatter::new("pt").relative_time(-2, RelativeUnit::Month), "há 2 meses");
        assert_eq!(LocaleFormatter::new("de").relative_time(5, RelativeUnit::Year), "in 5 Jahren");
    }

    #[test]
    fn test_localized_dates() {
        let date = sample_date();
        let en = LocaleFormatter::new("en");
        assert_eq!(en.date(date, DateStyle::Long), "March 5, 2024");
        assert_eq!(en.date(date, DateStyle::Full), "Tuesday, March 5, 2024");
        assert_eq!(LocaleFormatter::new("de").date(date, DateStyle::Medium), "05.03.2024");
        assert_eq!(LocaleFormatter::new("fr").time(date), "14:30");

        let time = en.time(date);
        assert!(time.starts_with("2:30") && time.ends_with("PM"), "{time}");
        let datetime = en.datetime(date, DateStyle::Long);
        assert!(datetime.contains("March 5, 2024") && datetime.contains("2:30"), "{datetime}");
    }

    #[test]
    fn test_invalid_locale_falls_back() {
        let formatter = LocaleFormatter::new("not a locale!");
        let date = sample_date();
        assert_eq!(formatter.date(date, DateStyle::Long), "2024-03-05");
        assert_eq!(formatter.time(date), "14:30:00");
        assert_eq!(formatter.datetime(date, DateStyle::Short), "2024-03-05 14:30:00");
        assert_eq!(formatter.number(1234.5, Some(2)), "1234.50");
        assert_eq!(formatter.currency(3.0, "EUR"), "EUR 3.00");
        assert_eq!(formatter.percent(0.25, 0), "25%");
        assert_eq!(formatter.list(&["a", "b", "c"], ListStyle::Disjunction), "a, b or c");
        assert_eq!(formatter.relative_time(2, RelativeUnit::Week), "in 2 weeks");
        assert_eq!(formatter.relative_time(-1, RelativeUnit::Day), "1 day ago");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        assert_eq!(
            LocaleFormatter::new("not a locale!").try_format(&FormatValue::Number(1.0, None)),
            Err(FormatError::InvalidLocale("not a locale!".to_string()))
        );
        assert_eq!(
            LocaleFormatter::new("en").try_format(&FormatValue::Currency(5.0, "dollars".into())),
            Err(FormatError::InvalidCurrency("dollars".to_string()))
        );
        assert_eq!(LocaleFormatter::new("en").currency(5.0, "dollars"), "dollars 5.00");
        assert_eq!(LocaleFormatter::new("en").number(f64::NAN, None), "NaN");
    }
}
