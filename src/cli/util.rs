use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::database::models::{month_key, parse_month};

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn fmt_pct(d: &Decimal) -> String {
    format!("{:.1}%", d.round_dp(1))
}

pub fn parse_date_any(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn current_month() -> String {
    month_key(today())
}

/// Moves a `YYYY-MM` key by `delta` months; invalid keys come back unchanged.
pub fn shift_month(month: &str, delta: i32) -> String {
    let Some(first) = parse_month(month) else {
        return month.to_string();
    };
    let index = first.year() * 12 + first.month0() as i32 + delta;
    let (year, month0) = (index.div_euclid(12), index.rem_euclid(12) as u32);
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .map(month_key)
        .unwrap_or_else(|| month.to_string())
}
