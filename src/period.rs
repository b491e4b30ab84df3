use crate::error::Error;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A calendar quarter, written as a `YYYYQ` code such as `20241`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    /// One-based quarter, 1 to 4.
    q: u8,
}

impl Quarter {
    /// Creates a new `Quarter`.
    ///
    /// Returns `None` if `q` is not between 1 and 4.
    pub fn new(year: i32, q: u8) -> Option<Self> {
        (1..=4).contains(&q).then_some(Self { year, q })
    }

    /// The quarter that contains `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            q: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn q(&self) -> u8 {
        self.q
    }

    /// Moves `delta` quarters forward, or backward when negative.
    pub fn shift(self, delta: i32) -> Self {
        let index = self.year * 4 + (self.q as i32 - 1) + delta;
        Self {
            year: index.div_euclid(4),
            q: (index.rem_euclid(4) + 1) as u8,
        }
    }

    /// The `YYYYQ` code, e.g. `20241`.
    pub fn code(&self) -> String {
        format!("{}{}", self.year, self.q)
    }

    /// The `len` most recent complete quarters before `today`, as
    /// `(from, to)` inclusive.
    ///
    /// The quarter containing `today` is left out because its data is
    /// usually still incomplete.
    pub fn trailing_window(today: NaiveDate, len: u32) -> (Self, Self) {
        let to = Self::of(today).shift(-1);
        let from = to.shift(1 - len.max(1) as i32);
        (from, to)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.q)
    }
}

impl FromStr for Quarter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || Error::InvalidPeriod {
            code: s.to_string(),
        };
        let s = s.trim();
        if s.len() != 5 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let (year, q) = s.split_at(s.len() - 1);
        let year = year.parse::<i32>().map_err(|_| err())?;
        let q = q.parse::<u8>().map_err(|_| err())?;
        Quarter::new(year, q).ok_or_else(err)
    }
}

impl TryFrom<String> for Quarter {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(quarter: Quarter) -> Self {
        quarter.code()
    }
}
