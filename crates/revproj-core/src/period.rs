//! Calendar helpers for month and quarter arithmetic.
//!
//! Months are numbered 1..=12 and quarters 1..=4 throughout the crate. Every
//! loop over a year walks these ranges in numeric order so results never
//! depend on the iteration order of a keyed input.

use std::ops::RangeInclusive;

use chrono::Month;

pub const MONTHS_PER_YEAR: usize = 12;
pub const QUARTERS_PER_YEAR: usize = 4;

/// Calendar months in order, January first.
pub const MONTHS: RangeInclusive<u32> = 1..=12;

/// Fiscal quarters in order.
pub const QUARTERS: RangeInclusive<u8> = 1..=4;

pub fn is_valid_month(month: u32) -> bool {
    MONTHS.contains(&month)
}

pub fn is_valid_quarter(quarter: u8) -> bool {
    QUARTERS.contains(&quarter)
}

/// Zero-based array slot for a month, `None` outside 1..=12.
pub fn month_index(month: u32) -> Option<usize> {
    if is_valid_month(month) {
        Some((month - 1) as usize)
    } else {
        None
    }
}

/// Preceding calendar month; January wraps to December.
pub fn previous_month(month: u32) -> u32 {
    if month == 1 {
        12
    } else {
        month - 1
    }
}

/// The three months that make up a quarter.
pub fn quarter_months(quarter: u8) -> RangeInclusive<u32> {
    let start = (u32::from(quarter) - 1) * 3 + 1;
    start..=start + 2
}

pub fn quarter_of(month: u32) -> u8 {
    ((month - 1) / 3 + 1) as u8
}

/// English month name, e.g. "March".
pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| format!("M{month:02}"))
}

/// Period label in the "2024Q2" form used by earnings disclosures.
pub fn quarter_label(year: i32, quarter: u8) -> String {
    format!("{year}Q{quarter}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_month_wraps_january() {
        assert_eq!(previous_month(1), 12);
        assert_eq!(previous_month(7), 6);
    }

    #[test]
    fn test_quarter_months() {
        assert_eq!(quarter_months(1).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(quarter_months(4).collect::<Vec<_>>(), vec![10, 11, 12]);
    }

    #[test]
    fn test_quarter_of() {
        assert_eq!(quarter_of(1), 1);
        assert_eq!(quarter_of(6), 2);
        assert_eq!(quarter_of(12), 4);
    }

    #[test]
    fn test_month_index_rejects_out_of_range() {
        assert_eq!(month_index(0), None);
        assert_eq!(month_index(13), None);
        assert_eq!(month_index(12), Some(11));
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(3), "March");
        assert_eq!(month_name(13), "M13");
    }
}
