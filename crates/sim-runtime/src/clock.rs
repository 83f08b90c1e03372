//! Game calendar: four weeks to a month, twelve months to a year.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const WEEKS_PER_MONTH: u64 = 4;
pub const MONTHS_PER_YEAR: u64 = 12;
/// Year of the default start date.
pub const START_YEAR: i32 = 2015;

/// What rolled over when a week passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockTick {
    pub new_month: bool,
    pub new_year: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    start: NaiveDate,
    weeks: u64,
}

impl Clock {
    pub fn new(start: NaiveDate) -> Self {
        Self { start, weeks: 0 }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn weeks_elapsed(&self) -> u64 {
        self.weeks
    }

    pub fn months_elapsed(&self) -> u64 {
        self.weeks / WEEKS_PER_MONTH
    }

    pub fn years_elapsed(&self) -> u64 {
        self.months_elapsed() / MONTHS_PER_YEAR
    }

    /// 0-based week within the current month.
    pub fn week_of_month(&self) -> u64 {
        self.weeks % WEEKS_PER_MONTH
    }

    /// Calendar date of the current week's first day. Each game week is
    /// seven days into its month.
    pub fn date(&self) -> NaiveDate {
        let months = u32::try_from(self.months_elapsed()).unwrap_or(u32::MAX);
        self.start
            .checked_add_months(Months::new(months))
            .and_then(|d| d.checked_add_days(Days::new(self.week_of_month() * 7)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn year(&self) -> i32 {
        self.date().year()
    }

    /// 1-based calendar month.
    pub fn month(&self) -> u32 {
        self.date().month()
    }

    pub fn advance_week(&mut self) -> ClockTick {
        self.weeks += 1;
        let new_month = self.weeks % WEEKS_PER_MONTH == 0;
        let new_year = new_month && self.months_elapsed() % MONTHS_PER_YEAR == 0;
        ClockTick {
            new_month,
            new_year,
        }
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02} week {}",
            self.year(),
            self.month(),
            self.week_of_month() + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> Clock {
        Clock::new(NaiveDate::from_ymd_opt(START_YEAR, 1, 1).unwrap())
    }

    #[test]
    fn months_roll_every_four_weeks() {
        let mut c = clock();
        let ticks: Vec<ClockTick> = (0..4).map(|_| c.advance_week()).collect();
        assert!(ticks[..3].iter().all(|t| !t.new_month));
        assert!(ticks[3].new_month);
        assert!(!ticks[3].new_year);
        assert_eq!(c.month(), 2);
        assert_eq!(c.week_of_month(), 0);
    }

    #[test]
    fn years_roll_every_forty_eight_weeks() {
        let mut c = clock();
        let mut years = 0;
        for _ in 0..96 {
            if c.advance_week().new_year {
                years += 1;
            }
        }
        assert_eq!(years, 2);
        assert_eq!(c.year(), START_YEAR + 2);
        assert_eq!(c.years_elapsed(), 2);
    }

    #[test]
    fn dates_and_display() {
        let mut c = clock();
        for _ in 0..6 {
            c.advance_week();
        }
        assert_eq!(c.date(), NaiveDate::from_ymd_opt(2015, 2, 15).unwrap());
        assert_eq!(c.to_string(), "2015-02 week 3");
    }
}
