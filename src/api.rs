// HTTP surface for the scheduler service. Thin layer: request shapes come
// in as JSON, get converted to domain types at this boundary, and handlers
// delegate to the service.

use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CreateEventInput, EventFilter, EventType, Role};

// HTTP Request types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolunteerRequest {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignShiftRequest {
    pub shift_id: String,
    pub volunteer_id: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct EventFilterRequest {
    pub cities: Vec<String>,
    pub event_type: Option<String>,
    pub roles: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct QualifiedVolunteersRequest {
    #[serde(default)]
    pub qualifications: Vec<String>,
}

impl EventFilterRequest {
    /// Boundary conversion to the domain filter. An unrecognized event type
    /// drops out (no restriction); a malformed role or date is rejected,
    /// since those fields are enumerated in the API contract.
    pub fn into_filter(self) -> AppResult<EventFilter> {
        let event_type = self.event_type.as_deref().and_then(EventType::parse);

        let mut roles = Vec::new();
        for raw in &self.roles {
            match Role::parse(raw) {
                Some(role) => roles.push(role),
                None => {
                    return Err(AppError::Validation(format!("unknown role: {}", raw)));
                }
            }
        }

        Ok(EventFilter {
            cities: self.cities,
            event_type,
            roles,
            start_date: parse_date("startDate", self.start_date.as_deref())?,
            end_date: parse_date("endDate", self.end_date.as_deref())?,
        })
    }
}

fn parse_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::Validation(format!("{} must be formatted YYYY-MM-DD: {}", field, raw))
            }),
    }
}

// HTTP Handlers

pub async fn search_events_handler(
    State(state): State<AppState>,
    Json(request): Json<EventFilterRequest>,
) -> Result<Json<Value>, AppError> {
    let filter = request.into_filter()?;
    let events = state.scheduler.get_filtered_events(&filter).await?;
    Ok(Json(json!({ "events": events })))
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>, AppError> {
    let event = state.scheduler.get_event_by_id(&id).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> Result<Json<Value>, AppError> {
    let event = state.scheduler.create_event(input).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn create_volunteer_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateVolunteerRequest>,
) -> Result<Json<Value>, AppError> {
    let volunteer = state
        .scheduler
        .create_volunteer(&request.first_name, &request.last_name)
        .await?;
    Ok(Json(json!({ "volunteer": volunteer })))
}

pub async fn qualified_volunteers_handler(
    State(state): State<AppState>,
    Json(request): Json<QualifiedVolunteersRequest>,
) -> Result<Json<Value>, AppError> {
    let volunteers = state
        .scheduler
        .get_qualified_volunteers(&request.qualifications)
        .await?;
    Ok(Json(json!({ "volunteers": volunteers })))
}

// Assignment never surfaces a hard error; the result record carries the
// outcome either way.
pub async fn assign_shift_handler(
    State(state): State<AppState>,
    Json(request): Json<AssignShiftRequest>,
) -> Json<Value> {
    let result = state
        .scheduler
        .assign_volunteer_to_shift(&request.shift_id, &request.volunteer_id)
        .await;
    Json(json!({ "assignment": result }))
}

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.scheduler.database().health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}

// Create the scheduler router
pub fn create_scheduler_router(state: AppState) -> Router {
    Router::new()
        // Event operations
        .route("/events/search", post(search_events_handler))
        .route("/events/{id}", get(get_event_handler))
        .route("/events", post(create_event_handler))
        // Volunteer operations
        .route("/volunteers", post(create_volunteer_handler))
        .route("/volunteers/qualified", post(qualified_volunteers_handler))
        // Assignment operations
        .route("/assignments", post(assign_shift_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conversion_resolves_enums_and_dates() {
        let request = EventFilterRequest {
            cities: vec!["Austin".to_string()],
            event_type: Some("HYBRID".to_string()),
            roles: vec!["speaker".to_string(), "ADVOCACY".to_string()],
            start_date: Some("2025-08-01".to_string()),
            end_date: None,
        };
        let filter = request.into_filter().unwrap();

        assert_eq!(filter.cities, vec!["Austin".to_string()]);
        assert_eq!(filter.event_type, Some(EventType::Hybrid));
        assert_eq!(filter.roles, vec![Role::Speaker, Role::Advocacy]);
        assert_eq!(
            filter.start_date,
            NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert_eq!(filter.end_date, None);
    }

    #[test]
    fn test_unknown_event_type_contributes_no_restriction() {
        let request = EventFilterRequest {
            event_type: Some("ON_SITE".to_string()),
            ..EventFilterRequest::default()
        };
        let filter = request.into_filter().unwrap();
        assert_eq!(filter.event_type, None);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let request = EventFilterRequest {
            roles: vec!["barista".to_string()],
            ..EventFilterRequest::default()
        };
        assert!(matches!(
            request.into_filter(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let request = EventFilterRequest {
            start_date: Some("08/01/2025".to_string()),
            ..EventFilterRequest::default()
        };
        assert!(matches!(
            request.into_filter(),
            Err(AppError::Validation(_))
        ));
    }
}
