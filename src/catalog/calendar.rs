//! Tradable-date calendars

use crate::SecurityType;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Lookup of the dates on which a security type trades
pub trait TradingCalendar: Send + Sync {
    /// Tradable dates within `[start, end]`, ascending
    fn tradable_dates(
        &self,
        security_type: SecurityType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<NaiveDate>;
}

/// Monday-to-Friday calendar with an optional holiday list
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    /// Create a calendar without holidays
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the given dates
    pub fn with_holidays<I: IntoIterator<Item = NaiveDate>>(mut self, holidays: I) -> Self {
        self.holidays.extend(holidays);
        self
    }

    fn is_tradable(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn tradable_dates(
        &self,
        _security_type: SecurityType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_tradable(*date))
            .collect()
    }
}
