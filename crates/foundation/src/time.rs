//! Time primitives for annual imagery epochs.

use serde::{Deserialize, Serialize};

/// One imagery epoch, identified by its calendar year.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(pub i32);

impl Year {
    pub const fn new(year: i32) -> Self {
        Year(year)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// First day of the year, `YYYY-01-01`.
    pub fn start_date(self) -> String {
        format!("{:04}-01-01", self.0)
    }

    /// Last day of the year, `YYYY-12-31`.
    pub fn end_date(self) -> String {
        format!("{:04}-12-31", self.0)
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Year {
    fn from(year: i32) -> Self {
        Year(year)
    }
}

/// Closed range of years, inclusive on both ends.
///
/// A range whose start lies after its end is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Year,
    pub end: Year,
}

impl YearRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self {
            start: Year(start),
            end: Year(end),
        }
    }

    pub fn contains(&self, year: Year) -> bool {
        self.start <= year && year <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let span = i64::from(self.end.0) - i64::from(self.start.0) + 1;
        usize::try_from(span).unwrap_or(usize::MAX)
    }

    pub fn iter(&self) -> impl Iterator<Item = Year> + use<> {
        (self.start.0..=self.end.0).map(Year)
    }

    /// Maps a slider index to its year.
    pub fn year_at(&self, index: usize) -> Option<Year> {
        if index >= self.len() {
            return None;
        }
        let year = i64::from(self.start.0) + i64::try_from(index).ok()?;
        i32::try_from(year).ok().map(Year)
    }

    pub fn index_of(&self, year: Year) -> Option<usize> {
        if !self.contains(year) {
            return None;
        }
        usize::try_from(i64::from(year.0) - i64::from(self.start.0)).ok()
    }

    /// Sequential year labels, one per slider stop.
    pub fn labels(&self) -> Vec<String> {
        self.iter().map(|y| y.to_string()).collect()
    }
}
