//! Embedded birth date and the zodiac sign derived from it.

use chrono::{Datelike, NaiveDate};
use idcard_types::Constellation;

/// Parse an 8-digit `YYYYMMDD` string into a real calendar date.
pub fn parse_compact(date: &str) -> Option<NaiveDate> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = date[..4].parse().ok()?;
    let month: u32 = date[4..6].parse().ok()?;
    let day: u32 = date[6..].parse().ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `(first day, sign)` per month, January first. A day before the threshold
/// belongs to the previous month's sign.
const ZODIAC_STARTS: [(u32, Constellation); 12] = [
    (20, Constellation::Aquarius),
    (19, Constellation::Pisces),
    (21, Constellation::Aries),
    (20, Constellation::Taurus),
    (21, Constellation::Gemini),
    (22, Constellation::Cancer),
    (23, Constellation::Leo),
    (23, Constellation::Virgo),
    (23, Constellation::Libra),
    (24, Constellation::Scorpio),
    (22, Constellation::Sagittarius),
    (22, Constellation::Capricorn),
];

pub fn constellation(date: NaiveDate) -> Constellation {
    let idx = date.month0() as usize;
    let (start, sign) = ZODIAC_STARTS[idx];
    if date.day() >= start {
        sign
    } else {
        ZODIAC_STARTS[(idx + 11) % 12].1
    }
}
