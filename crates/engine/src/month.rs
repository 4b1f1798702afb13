//! Calendar month (`YYYY-MM`), the unit entries are grouped by.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, Utc};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns the `day` of this month, or `None` when it does not exist
    /// (e.g. day 31 of April).
    pub fn day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// The `count` months ending at (and including) `self`, oldest first.
    pub fn trailing(self, count: usize) -> Vec<Month> {
        let mut months = Vec::with_capacity(count);
        let mut cursor = self;
        for _ in 0..count {
            months.push(cursor);
            cursor = cursor.prev();
        }
        months.reverse();
        months
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = EngineError;

    /// Strict `YYYY-MM`: four digit year, two digit month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth(format!("'{s}' does not match YYYY-MM"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.chars().all(|c| c.is_ascii_digit())
            || !month.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints() {
        let month: Month = "2025-03".parse().unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn rejects_bad_shapes() {
        for bad in ["2025-3", "2025-13", "2025-00", "202-03", "2025/03", "abcd-ef", ""] {
            assert!(bad.parse::<Month>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn next_and_prev_cross_years() {
        let dec: Month = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
        assert_eq!(dec.next().prev(), dec);
    }

    #[test]
    fn trailing_is_oldest_first() {
        let feb: Month = "2025-02".parse().unwrap();
        let months: Vec<String> = feb.trailing(3).iter().map(ToString::to_string).collect();
        assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn day_handles_short_months() {
        let apr: Month = "2025-04".parse().unwrap();
        assert!(apr.day(30).is_some());
        assert!(apr.day(31).is_none());
    }
}
