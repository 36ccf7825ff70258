// src/forecasting/calendar.rs

use chrono::{Datelike, NaiveDate, Weekday};

/// Holiday calendar fed to the demand model as a monthly regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HolidayCalendar {
    /// No holiday effects.
    #[default]
    None,
    /// United States federal holidays.
    UsFederal,
}

impl HolidayCalendar {
    /// Named holidays falling in `year`, in date order.
    pub fn holidays(&self, year: i32) -> Vec<(NaiveDate, &'static str)> {
        match self {
            HolidayCalendar::None => Vec::new(),
            HolidayCalendar::UsFederal => us_federal(year),
        }
    }

    /// Number of holidays in the month of `period`.
    pub fn holidays_in_month(&self, period: NaiveDate) -> usize {
        self.holidays(period.year())
            .iter()
            .filter(|(day, _)| day.month() == period.month())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, HolidayCalendar::None)
    }
}

fn us_federal(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let fixed = |month, day| NaiveDate::from_ymd_opt(year, month, day);
    let nth = |month, weekday, n| NaiveDate::from_weekday_of_month_opt(year, month, weekday, n);
    // Memorial Day is the last Monday of May: the fifth if it exists, else the fourth.
    let last_monday_of_may = nth(5, Weekday::Mon, 5).or_else(|| nth(5, Weekday::Mon, 4));

    [
        (fixed(1, 1), "New Year's Day"),
        (nth(1, Weekday::Mon, 3), "Martin Luther King Jr. Day"),
        (nth(2, Weekday::Mon, 3), "Washington's Birthday"),
        (last_monday_of_may, "Memorial Day"),
        (fixed(7, 4), "Independence Day"),
        (nth(9, Weekday::Mon, 1), "Labor Day"),
        (nth(10, Weekday::Mon, 2), "Columbus Day"),
        (fixed(11, 11), "Veterans Day"),
        (nth(11, Weekday::Thu, 4), "Thanksgiving"),
        (fixed(12, 25), "Christmas Day"),
    ]
    .into_iter()
    .filter_map(|(day, name)| day.map(|d| (d, name)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn us_federal_floating_holidays() {
        let days: Vec<NaiveDate> = HolidayCalendar::UsFederal
            .holidays(2016)
            .into_iter()
            .map(|(d, _)| d)
            .collect();

        assert_eq!(days.len(), 10);
        assert!(days.contains(&date(2016, 1, 18))); // MLK
        assert!(days.contains(&date(2016, 5, 30))); // Memorial Day
        assert!(days.contains(&date(2016, 11, 24))); // Thanksgiving
    }

    #[test]
    fn memorial_day_with_four_mondays() {
        // May 2015 has Mondays on the 4th, 11th, 18th and 25th.
        let days = HolidayCalendar::UsFederal.holidays(2015);
        assert!(days.contains(&(date(2015, 5, 25), "Memorial Day")));
    }

    #[test]
    fn counts_per_month() {
        let cal = HolidayCalendar::UsFederal;
        assert_eq!(cal.holidays_in_month(date(2016, 1, 1)), 2);
        assert_eq!(cal.holidays_in_month(date(2016, 11, 1)), 2);
        assert_eq!(cal.holidays_in_month(date(2016, 3, 1)), 0);
        assert_eq!(HolidayCalendar::None.holidays_in_month(date(2016, 1, 1)), 0);
    }
}
