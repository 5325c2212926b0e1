use crate::errors::HabitError;
use crate::models::{Habit, HabitDraft};
use crate::streak::{completed_today, compute_streak, parse_date};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

impl Habit {
    pub fn new(id: &str, name: &str, icon: &str, category: &str, target_days: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            category: category.to_string(),
            target_days,
            completed_dates: BTreeSet::new(),
            streak: 0,
            completed_today: false,
        }
    }

    /// Recomputes `streak` and `completed_today` from `completed_dates`.
    pub fn refresh(&mut self, today: NaiveDate) {
        self.streak = compute_streak(&self.completed_dates, today);
        self.completed_today = completed_today(&self.completed_dates, today);
    }

    pub fn progress_percent(&self) -> f64 {
        if self.target_days == 0 {
            return 0.0;
        }
        self.completed_dates.len() as f64 * 100.0 / f64::from(self.target_days)
    }

    pub fn from_draft(draft: HabitDraft, today: NaiveDate) -> Result<Self, HabitError> {
        let completed_dates = draft
            .completed_dates
            .iter()
            .map(|value| parse_date(value))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut habit = Self {
            id: draft.id,
            name: draft.name,
            icon: draft.icon,
            category: draft.category,
            target_days: draft.target_days,
            completed_dates,
            streak: 0,
            completed_today: false,
        };
        habit.refresh(today);
        Ok(habit)
    }
}

/// Flips today's completion for one habit and returns the new collection.
/// Every other habit is carried over untouched.
pub fn toggle(habits: &[Habit], habit_id: &str, today: NaiveDate) -> Result<Vec<Habit>, HabitError> {
    let index = habits
        .iter()
        .position(|habit| habit.id == habit_id)
        .ok_or_else(|| HabitError::NotFound(habit_id.to_string()))?;

    let mut updated = habits.to_vec();
    let habit = &mut updated[index];
    let is_completing = !habit.completed_dates.contains(&today);
    if is_completing {
        habit.completed_dates.insert(today);
    } else {
        habit.completed_dates.remove(&today);
    }
    habit.refresh(today);

    Ok(updated)
}

pub fn refresh_all(habits: &mut [Habit], today: NaiveDate) {
    for habit in habits.iter_mut() {
        habit.refresh(today);
    }
}

/// Validates a full client-supplied collection before it overwrites the
/// stored one.
pub fn replace_all(drafts: Vec<HabitDraft>, today: NaiveDate) -> Result<Vec<Habit>, HabitError> {
    let mut seen = HashSet::with_capacity(drafts.len());
    let mut habits = Vec::with_capacity(drafts.len());
    for draft in drafts {
        if !seen.insert(draft.id.clone()) {
            return Err(HabitError::DuplicateId(draft.id));
        }
        habits.push(Habit::from_draft(draft, today)?);
    }
    Ok(habits)
}

/// Habits every new account starts with.
pub fn default_habits() -> Vec<Habit> {
    vec![
        Habit::new("1", "Morning Meditation", "🧘", "Wellness", 30),
        Habit::new("2", "Drink 8 Glasses of Water", "💧", "Health", 30),
        Habit::new("3", "Read for 30 Minutes", "📚", "Learning", 30),
        Habit::new("4", "Exercise", "💪", "Fitness", 30),
    ]
}
