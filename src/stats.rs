use crate::models::{DailyPoint, Habit, HabitProgress, StatsResponse, StatsSummary, WeeklyPoint};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

const WEEK_COUNT: usize = 8;

/// Maps the `startOfWeek` preference onto a weekday; anything but
/// "sunday" means Monday.
pub fn first_day_of_week(preference: &str) -> Weekday {
    if preference.trim().eq_ignore_ascii_case("sunday") {
        Weekday::Sun
    } else {
        Weekday::Mon
    }
}

pub fn build_stats_at(today: NaiveDate, habits: &[Habit], first_day: Weekday) -> StatsResponse {
    let completed_today = habits.iter().filter(|habit| habit.completed_today).count();
    let completion_rate = if habits.is_empty() {
        0
    } else {
        (completed_today as f64 / habits.len() as f64 * 100.0).round() as u32
    };

    let summary = StatsSummary {
        total_habits: habits.len(),
        completed_today,
        completion_rate,
        total_completions: habits.iter().map(|habit| habit.completed_dates.len()).sum(),
        longest_streak: habits.iter().map(|habit| habit.streak).max().unwrap_or(0),
    };

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        last_7_days.push(DailyPoint {
            date: date.to_string(),
            day: date.format("%a").to_string(),
            completions: completions_on(habits, date),
        });
    }

    let current_week_start = week_start(today, first_day);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);
    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let completions: usize = (0..7)
            .map(|day_offset| completions_on(habits, start + Duration::days(day_offset)))
            .sum();

        let days_counted = if today < start {
            0
        } else if today > end {
            7
        } else {
            (today - start).num_days() as u8 + 1
        };
        let denom = if days_counted == 0 { 1.0 } else { f64::from(days_counted) };

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            completions,
            days_counted,
            avg_per_day: completions as f64 / denom,
        });
    }

    let habits = habits
        .iter()
        .map(|habit| HabitProgress {
            id: habit.id.clone(),
            name: habit.name.clone(),
            completions: habit.completed_dates.len(),
            target_days: habit.target_days,
            progress_percent: habit.progress_percent(),
            streak: habit.streak,
        })
        .collect();

    StatsResponse {
        summary,
        last_7_days,
        weekly_totals,
        habits,
    }
}

fn completions_on(habits: &[Habit], date: NaiveDate) -> usize {
    habits
        .iter()
        .filter(|habit| habit.completed_dates.contains(&date))
        .count()
}

fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(back))
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
