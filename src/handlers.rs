use crate::errors::AppError;
use crate::models::{
    ActivityRecord, ActivityType, ActivityTypeResponse, CreateActivityRequest, DailyStats,
    HistoryResponse, IndexQuery, TodayResponse,
};
use crate::navigation::Navigator;
use crate::state::AppState;
use crate::ui::{IndexPage, render_index};
use crate::validation::{ActivityForm, ActivityLimits, ValidationError, describe_limit};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::{DateTime, Local};

const LOG_FAILED: &str = "Failed to log activity. Please try again.";
const STATS_FAILED: &str = "Failed to load stats";
const ACTIVITIES_FAILED: &str = "Failed to load activities";

/// Always serves the page; a failed stats load becomes a banner over zeroed stats.
pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let mut navigator = Navigator::default();
    if let Some(screen) = query.screen {
        navigator.navigate_to(screen);
    }

    let (today, banner) = match today_response(&state).await {
        Ok(today) => (today, None),
        Err(err) => {
            let now = state.service.now();
            let today = TodayResponse {
                date: now.date_naive(),
                date_label: dashboard_date_label(&now),
                stats: DailyStats::default(),
            };
            (today, Some(err.message))
        }
    };

    let types = activity_type_table(&state.limits);
    Html(render_index(&IndexPage {
        today: &today,
        types: &types,
        screen: navigator.current(),
        banner: banner.as_deref(),
    }))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    Ok(Json(today_response(&state).await?))
}

pub async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityRecord>>, AppError> {
    let records = state
        .service
        .activities_last_seven_days()
        .await
        .map_err(|err| AppError::persistence(ACTIVITIES_FAILED, err))?;
    Ok(Json(records))
}

pub async fn create_activity(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityRecord>), AppError> {
    let mut form = ActivityForm::new(state.limits);
    form.select_type(payload.activity_type);
    form.set_value(payload.value_text());
    form.set_notes(payload.notes.unwrap_or_default());
    let submission = form.submit()?;

    let record = state
        .service
        .log_activity(
            submission.activity_type,
            submission.value,
            submission.notes.as_deref(),
        )
        .await
        .map_err(|err| AppError::persistence(LOG_FAILED, err))?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, AppError> {
    let groups = state
        .service
        .history()
        .await
        .map_err(|err| AppError::persistence(ACTIVITIES_FAILED, err))?;
    Ok(Json(HistoryResponse { groups }))
}

pub async fn activity_types(State(state): State<AppState>) -> Json<Vec<ActivityTypeResponse>> {
    Json(activity_type_table(&state.limits))
}

async fn today_response(state: &AppState) -> Result<TodayResponse, AppError> {
    let now = state.service.now();
    let stats = state
        .service
        .today_stats()
        .await
        .map_err(|err| AppError::persistence(STATS_FAILED, err))?;

    Ok(TodayResponse {
        date: now.date_naive(),
        date_label: dashboard_date_label(&now),
        stats,
    })
}

fn activity_type_table(limits: &ActivityLimits) -> Vec<ActivityTypeResponse> {
    ActivityType::ALL
        .into_iter()
        .map(|activity_type| {
            let profile = activity_type.profile();
            let max = limits.max(activity_type);
            ActivityTypeResponse {
                activity_type,
                label: profile.label,
                unit: profile.unit,
                icon: profile.icon,
                placeholder: profile.placeholder,
                max,
                limit_label: describe_limit(activity_type, limits),
                limit_message: ValidationError::OutOfRange { activity_type, max }.to_string(),
            }
        })
        .collect()
}

/// "Tuesday, March 10, 2026"
fn dashboard_date_label(now: &DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}
