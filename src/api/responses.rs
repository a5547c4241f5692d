use crate::selection::SelectionMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct MetricsBody {
    pub total: u32,
    pub free_count: u32,
    pub occupied_count: u32,
    pub free_ratio: u8,
    pub last_updated: Option<String>,
    pub minutes_since_update: Option<u64>,
    pub freshness: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct CampusSummary {
    pub code: String,
    pub display_name: String,
    #[serde(flatten)]
    pub metrics: MetricsBody,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct FloorSummary {
    pub floor_code: String,
    #[serde(flatten)]
    pub metrics: MetricsBody,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct FloorPlan {
    pub floors: Vec<FloorSummary>,
    pub preferred_floor: Option<FloorSummary>,
    pub backup_floor: Option<FloorSummary>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct SelectionBody {
    pub campus_code: String,
    pub mode: SelectionMode,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub struct TotalsBody {
    pub free_count: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OverviewResponse {
    pub selection: SelectionBody,
    /// Campuses ranked by free spaces.
    pub campuses: Vec<CampusSummary>,
    pub best_campus: Option<String>,
    pub alternative_campus: Option<String>,
    pub totals: TotalsBody,
    pub selected_campus: CampusSummary,
    pub floor_plan: FloorPlan,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct SensorBody {
    pub sensor_id: i64,
    pub location_id: Option<String>,
    pub state: String,
    pub observed_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CampusDetailResponse {
    pub campus: CampusSummary,
    pub floor_plan: FloorPlan,
    pub sensors: Vec<SensorBody>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub campus_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SelectionResponse {
    pub selection: SelectionBody,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReadingsAcceptedResponse {
    pub accepted: usize,
    pub readings_stored: usize,
    pub selection: SelectionBody,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Empty,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponseBody {
    pub status: HealthStatus,
    pub readings: usize,
    pub sensors: usize,
    pub unattributed_sensors: usize,
    pub batches_applied: u64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownCampus,
    InvalidPayload,
    InternalError,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub error_message: String,
    pub timestamp: String,
}
