use crate::errors::{AppError, AppJson, HabitError};
use crate::habits::{default_habits, refresh_all, replace_all, toggle};
use crate::identity::CurrentUser;
use crate::models::{
    AccountResponse, CreateAccountRequest, DateQuery, ExportData, ExportResponse, HabitsResponse,
    Profile, ProfileResponse, ProfileUpdate, ReplaceHabitsRequest, SettingsResponse, SettingsUpdate,
    StatsResponse,
};
use crate::state::AppState;
use crate::stats::{build_stats_at, first_day_of_week};
use crate::storage::{
    load_habits, load_profile, load_settings, save_habits, save_profile, save_settings,
};
use crate::streak::parse_date;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use tracing::info;

pub async fn create_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let email = payload.email.trim();
    let name = payload.name.trim();
    if email.is_empty() || name.is_empty() {
        return Err(AppError::bad_request("email and name are required"));
    }

    let _guard = state.writes.lock().await;
    if load_profile(state.store.as_ref(), &user).await?.is_some() {
        return Err(AppError::conflict("account already exists"));
    }

    let profile = Profile {
        email: email.to_string(),
        name: name.to_string(),
        joined_date: Utc::now(),
    };
    let mut habits = default_habits();
    refresh_all(&mut habits, today());

    // Habits first: the profile marks the account as created.
    save_habits(state.store.as_ref(), &user, &habits).await?;
    save_profile(state.store.as_ref(), &user, &profile).await?;
    info!(%user, "account created with {} default habits", habits.len());

    Ok(Json(AccountResponse { profile, habits }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = load_profile(state.store.as_ref(), &user)
        .await?
        .ok_or_else(|| AppError::not_found("profile not found"))?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(update): AppJson<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    let _guard = state.writes.lock().await;
    let mut profile = load_profile(state.store.as_ref(), &user)
        .await?
        .ok_or_else(|| AppError::not_found("profile not found"))?;

    if let Some(email) = update.email.filter(|email| !email.trim().is_empty()) {
        profile.email = email.trim().to_string();
    }
    if let Some(name) = update.name.filter(|name| !name.trim().is_empty()) {
        profile.name = name.trim().to_string();
    }

    save_profile(state.store.as_ref(), &user, &profile).await?;
    Ok(Json(ProfileResponse { profile }))
}

pub async fn get_habits(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DateQuery>,
) -> Result<Json<HabitsResponse>, AppError> {
    let today = resolve_today(&query)?;
    let mut habits = load_habits(state.store.as_ref(), &user).await?;
    refresh_all(&mut habits, today);
    Ok(Json(HabitsResponse { habits }))
}

pub async fn replace_habits(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DateQuery>,
    AppJson(payload): AppJson<ReplaceHabitsRequest>,
) -> Result<Json<HabitsResponse>, AppError> {
    let today = resolve_today(&query)?;
    let habits = replace_all(payload.habits, today)?;

    let _guard = state.writes.lock().await;
    save_habits(state.store.as_ref(), &user, &habits).await?;
    info!(%user, "replaced {} habits", habits.len());

    Ok(Json(HabitsResponse { habits }))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<HabitsResponse>, AppError> {
    let today = resolve_today(&query)?;

    let _guard = state.writes.lock().await;
    let mut habits = load_habits(state.store.as_ref(), &user).await?;
    refresh_all(&mut habits, today);
    let habits = toggle(&habits, &habit_id, today)?;
    save_habits(state.store.as_ref(), &user, &habits).await?;

    if let Some(habit) = habits.iter().find(|habit| habit.id == habit_id) {
        info!(
            %user,
            habit = %habit.id,
            completed = habit.completed_today,
            streak = habit.streak,
            "toggled habit for {today}"
        );
    }

    Ok(Json(HabitsResponse { habits }))
}

pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = load_settings(state.store.as_ref(), &user).await?;
    Ok(Json(SettingsResponse { settings }))
}

pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(update): AppJson<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, AppError> {
    let _guard = state.writes.lock().await;
    let mut settings = load_settings(state.store.as_ref(), &user).await?;
    if let Some(notifications) = update.notifications {
        settings.notifications = notifications;
    }
    if let Some(preferences) = update.preferences {
        settings.preferences = preferences;
    }
    if let Some(privacy) = update.privacy {
        settings.privacy = privacy;
    }

    save_settings(state.store.as_ref(), &user, &settings).await?;
    Ok(Json(SettingsResponse { settings }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DateQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let today = resolve_today(&query)?;
    let mut habits = load_habits(state.store.as_ref(), &user).await?;
    refresh_all(&mut habits, today);
    let settings = load_settings(state.store.as_ref(), &user).await?;

    let first_day = first_day_of_week(&settings.preferences.start_of_week);
    Ok(Json(build_stats_at(today, &habits, first_day)))
}

pub async fn export_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ExportResponse>, AppError> {
    let store = state.store.as_ref();
    let mut habits = load_habits(store, &user).await?;
    refresh_all(&mut habits, today());

    let data = ExportData {
        profile: load_profile(store, &user).await?,
        habits,
        settings: load_settings(store, &user).await?,
        export_date: Utc::now(),
    };
    info!(%user, "exported account data");
    Ok(Json(ExportResponse { data }))
}

fn resolve_today(query: &DateQuery) -> Result<NaiveDate, HabitError> {
    match query.date.as_deref() {
        Some(value) => parse_date(value),
        None => Ok(today()),
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
