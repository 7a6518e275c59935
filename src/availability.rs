// Availability oracle and the calendar's date-range selection
//
// There is no reservation ledger behind this: a day is blocked purely by its
// position in the year, so two visitors can book the same vehicle for
// overlapping dates.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BLOCK_EVERY: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityOracle {
    block_every: u32,
}

impl Default for AvailabilityOracle {
    fn default() -> Self {
        Self {
            block_every: DEFAULT_BLOCK_EVERY,
        }
    }
}

impl AvailabilityOracle {
    /// Blocks every `block_every`-th day of the year. Zero disables blocking.
    pub fn new(block_every: u32) -> Self {
        Self { block_every }
    }

    /// Days since Jan 0 of the date's year, so Jan 1 is day 1.
    pub fn day_of_year(date: NaiveDate) -> u32 {
        date.ordinal()
    }

    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.block_every != 0 && Self::day_of_year(date) % self.block_every == 0
    }

    pub fn is_available(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= today && !self.is_blocked(date)
    }

    /// Same as `is_available`, measured against the local calendar date.
    pub fn is_available_now(&self, date: NaiveDate) -> bool {
        self.is_available(date, Local::now().date_naive())
    }

    /// Every unavailable day of a month, for greying out the calendar.
    /// An invalid month yields an empty list.
    pub fn blocked_dates_in(&self, year: i32, month: u32, today: NaiveDate) -> Vec<NaiveDate> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };

        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .filter(|d| !self.is_available(*d, today))
            .collect()
    }
}

/// Progress of the pickup/dropoff selection on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum DateSelection {
    #[default]
    Empty,
    StartOnly(NaiveDate),
    Range {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl DateSelection {
    /// Applies a click on `date`. Clicks on unavailable days leave the
    /// selection untouched.
    pub fn click(self, date: NaiveDate, oracle: &AvailabilityOracle, today: NaiveDate) -> Self {
        if !oracle.is_available(date, today) {
            return self;
        }

        match self {
            DateSelection::StartOnly(start) if date >= start => {
                DateSelection::Range { start, end: date }
            }
            DateSelection::Empty | DateSelection::StartOnly(_) | DateSelection::Range { .. } => {
                DateSelection::StartOnly(date)
            }
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            DateSelection::Empty => None,
            DateSelection::StartOnly(start) | DateSelection::Range { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<NaiveDate> {
        match self {
            DateSelection::Range { end, .. } => Some(*end),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DateSelection::Range { .. })
    }
}
