use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod locality;
pub mod store;

pub type SensorId = i64;

/// Occupancy state reported by a sensor.
///
/// Only `Free` counts as free space in rollups; `Occupied` and any unrecognized
/// value share the "not free" bucket. State names are matched exactly, so
/// `"Libre"` is unrecognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OccupancyState {
    Occupied,
    Free,
    Unknown(String),
}

impl OccupancyState {
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Occupied => "occupied",
            Self::Free => "free",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for OccupancyState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "free" | "libre" => Self::Free,
            "occupied" | "ocupado" => Self::Occupied,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<OccupancyState> for String {
    fn from(state: OccupancyState) -> Self {
        match state {
            OccupancyState::Occupied => "occupied".to_string(),
            OccupancyState::Free => "free".to_string(),
            OccupancyState::Unknown(raw) => raw,
        }
    }
}

/// One point-in-time observation of a sensor. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: SensorId,
    #[serde(default, alias = "estacionamiento_id")]
    pub location_id: Option<String>,
    #[serde(alias = "estado")]
    pub state: OccupancyState,
    #[serde(default, alias = "created_at", with = "time::serde::rfc3339::option")]
    pub observed_at: Option<OffsetDateTime>,
}

impl Reading {
    pub fn new(
        sensor_id: SensorId,
        location_id: Option<&str>,
        state: OccupancyState,
        observed_at: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            sensor_id,
            location_id: location_id.map(str::to_string),
            state,
            observed_at,
        }
    }

    /// Recency used for resolution; a missing timestamp ranks as the unix epoch.
    pub fn recency(&self) -> OffsetDateTime {
        self.observed_at.unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_source_field_names() -> Result<(), Box<dyn std::error::Error>> {
        let reading: Reading = serde_json::from_value(json!({
            "sensor_id": 1001,
            "estacionamiento_id": "MON-A1",
            "estado": "libre",
            "created_at": "2026-01-11T12:30:00Z"
        }))?;

        assert_eq!(reading.sensor_id, 1001);
        assert_eq!(reading.location_id.as_deref(), Some("MON-A1"));
        assert_eq!(reading.state, OccupancyState::Free);
        assert_eq!(
            reading.observed_at.map(OffsetDateTime::unix_timestamp),
            Some(1_768_134_600)
        );
        Ok(())
    }

    #[test]
    fn missing_location_and_timestamp_are_allowed() -> Result<(), Box<dyn std::error::Error>> {
        let reading: Reading = serde_json::from_value(json!({
            "sensor_id": 7,
            "state": "occupied"
        }))?;

        assert_eq!(reading.location_id, None);
        assert_eq!(reading.observed_at, None);
        assert_eq!(reading.recency(), OffsetDateTime::UNIX_EPOCH);
        Ok(())
    }

    #[test]
    fn unrecognized_state_is_kept_and_not_free() {
        let state = OccupancyState::from("maintenance".to_string());

        assert_eq!(state, OccupancyState::Unknown("maintenance".to_string()));
        assert!(!state.is_free());
        assert_eq!(state.as_str(), "maintenance");
    }

    #[test]
    fn state_names_match_exactly() {
        assert_eq!(OccupancyState::from("libre".to_string()), OccupancyState::Free);
        assert_eq!(
            OccupancyState::from("Libre".to_string()),
            OccupancyState::Unknown("Libre".to_string())
        );
        assert!(!OccupancyState::from(" free".to_string()).is_free());
    }

    #[test]
    fn serializes_canonical_state_names() -> Result<(), Box<dyn std::error::Error>> {
        let reading = Reading::new(3, Some("SMG-B2"), OccupancyState::from("ocupado".to_string()), None);

        let value = serde_json::to_value(&reading)?;

        assert_eq!(
            value,
            json!({
                "sensor_id": 3,
                "location_id": "SMG-B2",
                "state": "occupied",
                "observed_at": null
            })
        );
        Ok(())
    }
}
