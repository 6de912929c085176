// src/calendar.rs
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::config::Region;

/// Regional holiday provider. Implementations yield the official
/// holidays for one calendar year; everything else in the calendar
/// service is region-agnostic.
pub trait HolidayCalendar {
    fn holidays(&self, year: i32) -> Vec<NaiveDate>;
}

/// Official holidays observed in Catalonia: the Spanish national days
/// plus the Catalan regional ones. Movable feasts are derived from the
/// Gregorian Easter date.
pub struct Catalonia;

impl HolidayCalendar for Catalonia {
    fn holidays(&self, year: i32) -> Vec<NaiveDate> {
        let easter = easter_sunday(year);
        vec![
            ymd(year, 1, 1),            // Cap d'Any
            ymd(year, 1, 6),            // Reis
            easter - Duration::days(2), // Divendres Sant
            easter + Duration::days(1), // Dilluns de Pasqua
            ymd(year, 5, 1),            // Festa del Treball
            ymd(year, 6, 24),           // Sant Joan
            ymd(year, 8, 15),           // L'Assumpció
            ymd(year, 9, 11),           // Diada Nacional de Catalunya
            ymd(year, 10, 12),          // Festa Nacional d'Espanya
            ymd(year, 11, 1),           // Tots Sants
            ymd(year, 12, 6),           // Dia de la Constitució
            ymd(year, 12, 8),           // La Immaculada
            ymd(year, 12, 25),          // Nadal
            ymd(year, 12, 26),          // Sant Esteve
        ]
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid holiday date {}-{}-{}", year, month, day))
}

/// Gregorian Easter Sunday (Meeus/Jones/Butcher computus).
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

/// Calendar facts for the engine: working-day and holiday counts per
/// month, and business-day enumeration for absence apportionment.
/// Holiday sets are computed once per year and memoized; the service is
/// used from a single-threaded refresh cycle.
pub struct CalendarService {
    provider: Box<dyn HolidayCalendar>,
    holiday_cache: RefCell<HashMap<i32, HashSet<NaiveDate>>>,
}

impl CalendarService {
    pub fn new(region: Region) -> Self {
        let provider: Box<dyn HolidayCalendar> = match region {
            Region::Catalonia => Box::new(Catalonia),
        };
        Self::with_provider(provider)
    }

    pub fn with_provider(provider: Box<dyn HolidayCalendar>) -> Self {
        Self {
            provider,
            holiday_cache: RefCell::new(HashMap::new()),
        }
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let year = date.year();
        let mut cache = self.holiday_cache.borrow_mut();
        let set = cache
            .entry(year)
            .or_insert_with(|| self.provider.holidays(year).into_iter().collect());
        set.contains(&date)
    }

    /// Returns (working_days, working_holidays) for the month:
    /// Monday-Friday calendar dates, and official holidays that fall on
    /// one of those dates. Year/month always come from existing
    /// timestamps, so there are no error paths.
    pub fn working_days_and_holidays(&self, year: i32, month: u32) -> (u32, u32) {
        let (start, end) = month_bounds(year, month);
        let mut working_days = 0;
        let mut working_holidays = 0;
        let mut day = start;
        while day <= end {
            if is_weekday(day) {
                working_days += 1;
                if self.is_holiday(day) {
                    working_holidays += 1;
                }
            }
            day += Duration::days(1);
        }
        (working_days, working_holidays)
    }

    /// Working days minus working holidays.
    pub fn net_business_days(&self, year: i32, month: u32) -> u32 {
        let (working_days, working_holidays) = self.working_days_and_holidays(year, month);
        working_days - working_holidays
    }

    /// Monday-Friday dates in `[start, finish]` (inclusive) that are not
    /// holidays. An inverted range yields an empty vec, not an error.
    pub fn business_days_in_range(&self, start: NaiveDate, finish: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        if start > finish {
            return days;
        }
        let mut day = start;
        while day <= finish {
            if is_weekday(day) && !self.is_holiday(day) {
                days.push(day);
            }
            day += Duration::days(1);
        }
        days
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First and last calendar date of the month.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let start = ymd(year, month, 1);
    let end = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    } - Duration::days(1);
    (start, end)
}
