//! Location identifier grammar: `campus ["-" floor]`.
//!
//! Only the first `-` separates the two segments, so `MON-A1-east` is campus
//! `MON` on floor `A1-east`. A missing or empty floor segment lands in the
//! [`GENERAL_FLOOR`] bucket.

use thiserror::Error;

pub const LOCATION_SEPARATOR: char = '-';
pub const GENERAL_FLOOR: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalityKey {
    pub campus_code: String,
    pub floor_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalityError {
    #[error("location id is missing")]
    Missing,
    #[error("location id {0:?} has no campus segment")]
    EmptyCampus(String),
}

pub fn parse(location_id: Option<&str>) -> Result<LocalityKey, LocalityError> {
    let raw = location_id.ok_or(LocalityError::Missing)?;
    if raw.is_empty() {
        return Err(LocalityError::Missing);
    }

    let (campus, floor) = match raw.split_once(LOCATION_SEPARATOR) {
        Some((campus, floor)) => (campus, Some(floor)),
        None => (raw, None),
    };

    if campus.is_empty() {
        return Err(LocalityError::EmptyCampus(raw.to_string()));
    }

    let floor_code = match floor {
        Some(floor) if !floor.is_empty() => floor,
        _ => GENERAL_FLOOR,
    };

    Ok(LocalityKey {
        campus_code: campus.to_string(),
        floor_code: floor_code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(campus: &str, floor: &str) -> LocalityKey {
        LocalityKey {
            campus_code: campus.to_string(),
            floor_code: floor.to_string(),
        }
    }

    #[test]
    fn splits_campus_and_floor() {
        assert_eq!(parse(Some("MON-A1")), Ok(key("MON", "A1")));
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(parse(Some("MON-A1-east")), Ok(key("MON", "A1-east")));
    }

    #[test]
    fn campus_without_floor_uses_general_bucket() {
        assert_eq!(parse(Some("SMG")), Ok(key("SMG", GENERAL_FLOOR)));
        assert_eq!(parse(Some("SMG-")), Ok(key("SMG", GENERAL_FLOOR)));
    }

    #[test]
    fn missing_or_empty_location_is_rejected() {
        assert_eq!(parse(None), Err(LocalityError::Missing));
        assert_eq!(parse(Some("")), Err(LocalityError::Missing));
    }

    #[test]
    fn empty_campus_segment_is_rejected() {
        assert_eq!(
            parse(Some("-A1")),
            Err(LocalityError::EmptyCampus("-A1".to_string()))
        );
    }
}
