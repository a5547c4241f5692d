use crate::aggregation::DashboardView;
use crate::aggregation::ranking::{FloorRecommendation, freshness_label, minutes_since};
use crate::aggregation::rollup::{CampusRollup, FloorRollup, OccupancyMetrics};
use crate::api::responses::{
    CampusDetailResponse, CampusSummary, ErrorCode, ErrorResponse, FloorPlan, FloorSummary,
    HealthResponseBody, HealthStatus, MetricsBody, OverviewResponse, ReadingsAcceptedResponse,
    SelectionBody, SelectionRequest, SelectionResponse, SensorBody, TotalsBody,
};
use crate::error::AppError;
use crate::reading::Reading;
use crate::selection::SelectionState;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

pub type SharedState = Arc<RwLock<AppState>>;

pub enum ApiResponse<T> {
    Success { status: StatusCode, body: T },
    Error { status: StatusCode, body: ErrorResponse },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success { status, body } => (status, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<SharedState>) -> impl IntoResponse {
    build_health_response(&state, OffsetDateTime::now_utc())
}

pub async fn get_overview(State(state): State<SharedState>) -> impl IntoResponse {
    build_overview_response(&state, OffsetDateTime::now_utc())
}

pub async fn get_campus(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    build_campus_response(&state, &code, OffsetDateTime::now_utc())
}

pub async fn put_selection(
    State(state): State<SharedState>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let now = OffsetDateTime::now_utc();
    match payload {
        Ok(Json(request)) => build_selection_response(&state, &request.campus_code, now),
        Err(rejection) => invalid_payload("/api/selection", &rejection, now),
    }
}

pub async fn post_readings(
    State(state): State<SharedState>,
    payload: Result<Json<Vec<Reading>>, JsonRejection>,
) -> impl IntoResponse {
    let now = OffsetDateTime::now_utc();
    match payload {
        Ok(Json(batch)) => build_readings_response(&state, batch, now),
        Err(rejection) => invalid_payload("/api/readings", &rejection, now),
    }
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.format(&Rfc3339).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format timestamp");
        FALLBACK_TIMESTAMP.to_string()
    })
}

fn metrics_body(metrics: &OccupancyMetrics, now: OffsetDateTime) -> MetricsBody {
    let minutes = minutes_since(now, metrics.last_updated);
    MetricsBody {
        total: metrics.total,
        free_count: metrics.free_count,
        occupied_count: metrics.occupied_count,
        free_ratio: metrics.free_ratio,
        last_updated: metrics.last_updated.map(format_timestamp),
        minutes_since_update: minutes,
        freshness: freshness_label(minutes),
    }
}

fn campus_summary(campus: &CampusRollup, now: OffsetDateTime) -> CampusSummary {
    CampusSummary {
        code: campus.code.clone(),
        display_name: campus.display_name.clone(),
        metrics: metrics_body(&campus.metrics, now),
    }
}

fn floor_summary(floor: &FloorRollup, now: OffsetDateTime) -> FloorSummary {
    FloorSummary {
        floor_code: floor.floor_code.clone(),
        metrics: metrics_body(&floor.metrics, now),
    }
}

fn floor_plan(view: &DashboardView, campus_code: &str, now: OffsetDateTime) -> FloorPlan {
    let FloorRecommendation { preferred, backup } = view.floor_recommendation(campus_code);
    FloorPlan {
        floors: view
            .ranked_floors(campus_code)
            .iter()
            .map(|floor| floor_summary(floor, now))
            .collect(),
        preferred_floor: preferred.map(|floor| floor_summary(floor, now)),
        backup_floor: backup.map(|floor| floor_summary(floor, now)),
    }
}

fn selection_body(selection: &SelectionState) -> SelectionBody {
    SelectionBody {
        campus_code: selection.selected_campus_code.clone(),
        mode: selection.mode,
    }
}

fn sensor_body(reading: &Reading) -> SensorBody {
    SensorBody {
        sensor_id: reading.sensor_id,
        location_id: reading.location_id.clone(),
        state: reading.state.as_str().to_string(),
        observed_at: reading.observed_at.map(format_timestamp),
    }
}

fn error_response<T>(
    status: StatusCode,
    error_code: ErrorCode,
    message: String,
    now: OffsetDateTime,
) -> ApiResponse<T> {
    ApiResponse::Error {
        status,
        body: ErrorResponse {
            error_code,
            error_message: message,
            timestamp: format_timestamp(now),
        },
    }
}

fn internal_error<T>(route: &str, message: &str, now: OffsetDateTime) -> ApiResponse<T> {
    error!(route = route, message = message, "Internal error while handling request");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalError,
        INTERNAL_ERROR_MESSAGE.to_string(),
        now,
    )
}

fn invalid_payload<T>(
    route: &str,
    rejection: &JsonRejection,
    now: OffsetDateTime,
) -> ApiResponse<T> {
    let message = rejection.body_text();
    info!(route = route, reason = %message, "Rejected request payload");
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::InvalidPayload,
        message,
        now,
    )
}

fn unknown_campus<T>(code: &str, now: OffsetDateTime) -> ApiResponse<T> {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::UnknownCampus,
        AppError::UnknownCampus(code.to_string()).to_string(),
        now,
    )
}

fn build_health_response(
    state: &SharedState,
    now: OffsetDateTime,
) -> ApiResponse<HealthResponseBody> {
    let guard = match state.read() {
        Ok(guard) => guard,
        Err(_) => return internal_error("/api/health", "state lock poisoned", now),
    };
    let view = guard.view();
    let readings = guard.reading_count();
    let batches_applied = guard.batches_applied();
    drop(guard);

    let status = if view.resolved().is_empty() {
        HealthStatus::Empty
    } else {
        HealthStatus::Ok
    };

    ApiResponse::Success {
        status: StatusCode::OK,
        body: HealthResponseBody {
            status,
            readings,
            sensors: view.resolved().len(),
            unattributed_sensors: view.unattributed(),
            batches_applied,
            timestamp: format_timestamp(now),
        },
    }
}

fn build_overview_response(
    state: &SharedState,
    now: OffsetDateTime,
) -> ApiResponse<OverviewResponse> {
    let guard = match state.read() {
        Ok(guard) => guard,
        Err(_) => return internal_error("/api/overview", "state lock poisoned", now),
    };
    let view = guard.view();
    let selection = guard.selection().clone();
    drop(guard);

    let selected_code = selection.selected_campus_code.as_str();
    let Some(selected) = view.campus(selected_code) else {
        return internal_error("/api/overview", "selected campus missing from view", now);
    };
    let totals = view.totals();

    ApiResponse::Success {
        status: StatusCode::OK,
        body: OverviewResponse {
            selection: selection_body(&selection),
            campuses: view
                .ranked_campuses()
                .iter()
                .map(|campus| campus_summary(campus, now))
                .collect(),
            best_campus: view.best_campus().map(|campus| campus.code.clone()),
            alternative_campus: view
                .alternative_campus(selected_code)
                .map(|campus| campus.code.clone()),
            totals: TotalsBody {
                free_count: totals.free_count,
                total: totals.total,
            },
            selected_campus: campus_summary(selected, now),
            floor_plan: floor_plan(&view, selected_code, now),
            timestamp: format_timestamp(now),
        },
    }
}

fn build_campus_response(
    state: &SharedState,
    code: &str,
    now: OffsetDateTime,
) -> ApiResponse<CampusDetailResponse> {
    let view = match state.read() {
        Ok(guard) => guard.view(),
        Err(_) => return internal_error("/api/campuses", "state lock poisoned", now),
    };

    let Some(campus) = view.campus(code) else {
        return unknown_campus(code, now);
    };

    ApiResponse::Success {
        status: StatusCode::OK,
        body: CampusDetailResponse {
            campus: campus_summary(campus, now),
            floor_plan: floor_plan(&view, code, now),
            sensors: view
                .sensors_for_campus(code)
                .into_iter()
                .map(sensor_body)
                .collect(),
            timestamp: format_timestamp(now),
        },
    }
}

fn build_selection_response(
    state: &SharedState,
    code: &str,
    now: OffsetDateTime,
) -> ApiResponse<SelectionResponse> {
    let mut guard = match state.write() {
        Ok(guard) => guard,
        Err(_) => return internal_error("/api/selection", "state lock poisoned", now),
    };
    let result = guard.select_campus(code);
    drop(guard);

    match result {
        Ok(selection) => {
            info!(campus = code, "Campus selected");
            ApiResponse::Success {
                status: StatusCode::OK,
                body: SelectionResponse {
                    selection: selection_body(&selection),
                    timestamp: format_timestamp(now),
                },
            }
        }
        Err(AppError::UnknownCampus(code)) => unknown_campus(&code, now),
        Err(err) => internal_error("/api/selection", &err.to_string(), now),
    }
}

fn build_readings_response(
    state: &SharedState,
    batch: Vec<Reading>,
    now: OffsetDateTime,
) -> ApiResponse<ReadingsAcceptedResponse> {
    let accepted = batch.len();
    let mut guard = match state.write() {
        Ok(guard) => guard,
        Err(_) => return internal_error("/api/readings", "state lock poisoned", now),
    };
    guard.apply_batch(batch);
    let readings_stored = guard.reading_count();
    let selection = selection_body(guard.selection());
    drop(guard);

    ApiResponse::Success {
        status: StatusCode::ACCEPTED,
        body: ReadingsAcceptedResponse {
            accepted,
            readings_stored,
            selection,
            timestamp: format_timestamp(now),
        },
    }
}
