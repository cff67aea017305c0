//! Payload checks shared by create and update.

use chrono::{FixedOffset, NaiveDate, NaiveTime};

use crate::error::AppError;

/// Returns the trimmed title, or `EmptyTitle` when it is missing or blank.
pub fn validate_title(candidate: Option<&str>) -> Result<&str, AppError> {
    match candidate.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(AppError::EmptyTitle),
    }
}

/// Accepts ISO-8601 dates and date-times. A literal `Z` is read as `+00:00`.
///
/// Shape: `YYYY-MM-DD[(T| )HH[:MM[:SS[.fraction]]][±HH[:MM]]]`, every field
/// fixed-width. chrono then rejects out-of-range calendar and clock values.
pub fn validate_date(candidate: &str) -> Result<(), AppError> {
    let normalized = candidate.replace('Z', "+00:00");
    parse_iso(&normalized).ok_or(AppError::BadDateFormat)
}

/// An absent or empty due date counts as "not provided" and is not checked.
pub fn validate_due_date(candidate: Option<&str>) -> Result<(), AppError> {
    match candidate {
        Some(value) if !value.is_empty() => validate_date(value),
        _ => Ok(()),
    }
}

fn parse_iso(input: &str) -> Option<()> {
    let mut cursor = Cursor::new(input);

    let year = cursor.digits(4)?;
    cursor.expect(b'-')?;
    let month = cursor.digits(2)?;
    cursor.expect(b'-')?;
    let day = cursor.digits(2)?;
    if year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)?;

    if cursor.is_done() {
        return Some(());
    }
    if !(cursor.eat(b'T') || cursor.eat(b' ')) {
        return None;
    }

    let hour = cursor.digits(2)?;
    let (mut minute, mut second, mut nanos) = (0, 0, 0);
    if cursor.eat(b':') {
        minute = cursor.digits(2)?;
        if cursor.eat(b':') {
            second = cursor.digits(2)?;
            if cursor.eat(b'.') {
                nanos = cursor.fraction()?;
            }
        }
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;

    if cursor.is_done() {
        return Some(());
    }

    let sign = if cursor.eat(b'+') {
        1
    } else if cursor.eat(b'-') {
        -1
    } else {
        return None;
    };
    let offset_hours = cursor.digits(2)?;
    let offset_minutes = if cursor.eat(b':') { cursor.digits(2)? } else { 0 };
    if offset_minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (offset_hours * 3600 + offset_minutes * 60) as i32)?;

    cursor.is_done().then_some(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { bytes: input.as_bytes(), pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.eat(byte).then_some(())
    }

    /// Exactly `count` ASCII digits.
    fn digits(&mut self, count: usize) -> Option<u32> {
        let field = self.bytes.get(self.pos..self.pos + count)?;
        if !field.iter().all(u8::is_ascii_digit) {
            return None;
        }
        self.pos += count;
        Some(field.iter().fold(0, |acc, b| acc * 10 + u32::from(b - b'0')))
    }

    /// One to nine fractional digits, scaled to nanoseconds.
    fn fraction(&mut self) -> Option<u32> {
        let len = self.bytes[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if !(1..=9).contains(&len) {
            return None;
        }
        let value = self.digits(len)?;
        Some(value * 10u32.pow(9 - len as u32))
    }
}
