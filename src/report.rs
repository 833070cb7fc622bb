use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use itertools::Itertools;
use std::collections::BTreeMap;

use crate::session::Session;
use crate::util::{percentage, rounded_ratio};

/// Weekdays in the order statistics and calendars enumerate them
pub const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Trailing window, inclusive of today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum StatsPeriod {
    #[default]
    #[strum(serialize = "Last Week")]
    LastWeek,
    #[strum(serialize = "Last Two Weeks")]
    LastTwoWeeks,
    #[strum(serialize = "Last Month")]
    LastMonth,
}

impl StatsPeriod {
    pub const ALL: [StatsPeriod; 3] = [
        StatsPeriod::LastWeek,
        StatsPeriod::LastTwoWeeks,
        StatsPeriod::LastMonth,
    ];

    pub fn days(&self) -> i64 {
        match self {
            StatsPeriod::LastWeek => 7,
            StatsPeriod::LastTwoWeeks => 14,
            StatsPeriod::LastMonth => 30,
        }
    }

    /// First and last day of the window ending on `today`
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(self.days() - 1), today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayStat {
    pub weekday: Weekday,
    /// Rounded mean over the days of this weekday that had activity
    pub average: u64,
    pub overtime: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodStats {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_time_in_period: u64,
    pub total_overtime_in_period: u64,
    pub overtime_percentage: u64,
    pub day_with_most_overtime: Option<Weekday>,
    pub max_overtime: u64,
    pub average_per_active_day: u64,
    pub days_with_activity: u64,
    /// Sunday through Saturday
    pub weekdays: Vec<WeekdayStat>,
    pub highest_day: Option<Weekday>,
    pub highest_avg: u64,
    pub lowest_day: Weekday,
    pub lowest_avg: u64,
}

impl PeriodStats {
    pub fn weekday(&self, day: Weekday) -> Option<&WeekdayStat> {
        self.weekdays.iter().find(|w| w.weekday == day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub minutes_worked: u64,
    pub has_overtime: bool,
}

/// Month grid, weeks starting on Sunday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCalendar {
    pub first_day: NaiveDate,
    pub weeks: Vec<[Option<CalendarCell>; 7]>,
}

impl MonthCalendar {
    pub fn title(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.weeks
            .iter()
            .flat_map(|w| w.iter())
            .flatten()
            .find(|c| c.date == date)
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `delta` months away from `date`'s month
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(date);
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta as u32))
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(first)
}

/// In-memory session history, loaded once and appended to as sessions are
/// saved. Every statistic is recomputed from it on demand.
#[derive(Debug, Clone, Default)]
pub struct History {
    sessions: Vec<Session>,
}

impl History {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn push(&mut self, session: Session) {
        self.sessions.push(session);
    }

    fn counted(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.counts_for_reporting())
    }

    pub fn lock_in_count(&self) -> usize {
        self.counted().count()
    }

    /// Seconds (duration + overtime) per date
    pub fn daily_totals(&self) -> BTreeMap<NaiveDate, u64> {
        self.counted()
            .map(|s| (s.date, s.credited_seconds()))
            .into_grouping_map()
            .sum()
            .into_iter()
            .collect()
    }

    pub fn daily_overtime(&self) -> BTreeMap<NaiveDate, u64> {
        self.counted()
            .map(|s| (s.date, s.overtime))
            .into_grouping_map()
            .sum()
            .into_iter()
            .collect()
    }

    pub fn period_stats(&self, period: StatsPeriod, today: NaiveDate) -> PeriodStats {
        let (start, end) = period.window(today);
        let totals = self.daily_totals();
        let overtime = self.daily_overtime();

        let mut total_time = 0;
        let mut total_overtime = 0;
        let mut days_with_activity = 0;
        let mut weekday_totals = [(0u64, 0u64); 7];
        let mut weekday_overtime = [0u64; 7];

        for (date, seconds) in totals.range(start..=end) {
            let idx = date.weekday().num_days_from_sunday() as usize;
            let day_overtime = overtime.get(date).copied().unwrap_or(0);

            weekday_totals[idx].0 += seconds;
            weekday_totals[idx].1 += 1;
            weekday_overtime[idx] += day_overtime;

            total_time += seconds;
            total_overtime += day_overtime;
            days_with_activity += 1;
        }

        let weekdays: Vec<WeekdayStat> = WEEK_ORDER
            .iter()
            .enumerate()
            .map(|(idx, &weekday)| WeekdayStat {
                weekday,
                average: rounded_ratio(weekday_totals[idx].0, weekday_totals[idx].1),
                overtime: weekday_overtime[idx],
            })
            .collect();

        let mut highest_day = None;
        let mut highest_avg = 0;
        let mut lowest: Option<(Weekday, u64)> = None;
        for stat in &weekdays {
            if stat.average > highest_avg {
                highest_avg = stat.average;
                highest_day = Some(stat.weekday);
            }
            if stat.average > 0 && lowest.map_or(true, |(_, avg)| stat.average < avg) {
                lowest = Some((stat.weekday, stat.average));
            }
        }
        let (lowest_day, lowest_avg) = lowest.unwrap_or_else(|| {
            let first_zero = weekdays
                .iter()
                .find(|w| w.average == 0)
                .map_or(Weekday::Sun, |w| w.weekday);
            (first_zero, 0)
        });

        let mut day_with_most_overtime = None;
        let mut max_overtime = 0;
        for stat in &weekdays {
            if stat.overtime > max_overtime {
                max_overtime = stat.overtime;
                day_with_most_overtime = Some(stat.weekday);
            }
        }

        PeriodStats {
            period_start: start,
            period_end: end,
            total_time_in_period: total_time,
            total_overtime_in_period: total_overtime,
            overtime_percentage: percentage(total_overtime, total_time),
            day_with_most_overtime,
            max_overtime,
            average_per_active_day: rounded_ratio(total_time, days_with_activity),
            days_with_activity,
            weekdays,
            highest_day,
            highest_avg,
            lowest_day,
            lowest_avg,
        }
    }

    /// Calendar for the month containing `month`
    pub fn month_calendar(&self, month: NaiveDate) -> MonthCalendar {
        let first_day = first_of_month(month);
        let next_month = shift_month(first_day, 1);
        let days_in_month = (next_month - first_day).num_days() as usize;
        let offset = first_day.weekday().num_days_from_sunday() as usize;

        let totals = self.daily_totals();
        let overtime = self.daily_overtime();

        let cells = offset + days_in_month;
        let mut weeks = vec![[None; 7]; cells.div_ceil(7)];
        for (n, date) in first_day.iter_days().take(days_in_month).enumerate() {
            let slot = offset + n;
            weeks[slot / 7][slot % 7] = Some(CalendarCell {
                date,
                minutes_worked: totals.get(&date).copied().unwrap_or(0) / 60,
                has_overtime: overtime.get(&date).copied().unwrap_or(0) > 0,
            });
        }

        MonthCalendar { first_day, weeks }
    }
}
