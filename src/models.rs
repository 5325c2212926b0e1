use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A tracked habit. `streak` and `completed_today` are derived from
/// `completed_dates` and are recomputed whenever the record is read or
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub category: String,
    pub target_days: u32,
    #[serde(default)]
    pub completed_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub completed_today: bool,
}

/// Client-supplied habit for bulk replacement; dates are validated on
/// conversion into [`Habit`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDraft {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_target_days")]
    pub target_days: u32,
    #[serde(default)]
    pub completed_dates: Vec<String>,
}

fn default_target_days() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
pub struct ReplaceHabitsRequest {
    pub habits: Vec<HabitDraft>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitsResponse {
    pub habits: Vec<Habit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub joined_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub profile: Profile,
    pub habits: Vec<Habit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub daily_reminders: bool,
    pub streak_alerts: bool,
    pub weekly_reports: bool,
    pub friend_activity: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            daily_reminders: true,
            streak_alerts: true,
            weekly_reports: true,
            friend_activity: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: String,
    pub reminder_time: String,
    pub start_of_week: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            reminder_time: "09:00".to_string(),
            start_of_week: "monday".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub profile_visibility: String,
    pub show_streak: bool,
    pub show_activity: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: "friends".to_string(),
            show_streak: true,
            show_activity: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub privacy: PrivacySettings,
}

/// Top-level sections replace the stored ones; absent sections are kept.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub notifications: Option<NotificationSettings>,
    pub preferences: Option<Preferences>,
    pub privacy: Option<PrivacySettings>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: Settings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub profile: Option<Profile>,
    pub habits: Vec<Habit>,
    pub settings: Settings,
    pub export_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub data: ExportData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_habits: usize,
    pub completed_today: usize,
    pub completion_rate: u32,
    pub total_completions: usize,
    pub longest_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub day: String,
    pub completions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub completions: usize,
    pub days_counted: u8,
    pub avg_per_day: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitProgress {
    pub id: String,
    pub name: String,
    pub completions: usize,
    pub target_days: u32,
    pub progress_percent: f64,
    pub streak: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub summary: StatsSummary,
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
    pub habits: Vec<HabitProgress>,
}
