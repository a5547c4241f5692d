use crate::aggregation::rollup::{CampusRollup, FloorRollup};
use time::OffsetDateTime;

/// Campuses ordered by free spaces, most first. The sort is stable, so equal
/// counts keep catalog order.
pub fn rank_campuses(campuses: &[CampusRollup]) -> Vec<CampusRollup> {
    let mut ranked = campuses.to_vec();
    ranked.sort_by(|a, b| b.metrics.free_count.cmp(&a.metrics.free_count));
    ranked
}

/// Highest-ranked campus that has at least one contributing sensor.
pub fn best_campus(ranked: &[CampusRollup]) -> Option<&CampusRollup> {
    ranked.iter().find(|campus| campus.metrics.total > 0)
}

/// Highest-ranked campus other than `selected`.
pub fn alternative_campus<'a>(
    ranked: &'a [CampusRollup],
    selected: &str,
) -> Option<&'a CampusRollup> {
    ranked.iter().find(|campus| campus.code != selected)
}

/// Floors ordered by free spaces, most first, keeping input order on ties.
pub fn rank_floors(floors: &[FloorRollup]) -> Vec<FloorRollup> {
    let mut ranked = floors.to_vec();
    ranked.sort_by(|a, b| b.metrics.free_count.cmp(&a.metrics.free_count));
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorRecommendation<'a> {
    pub preferred: Option<&'a FloorRollup>,
    pub backup: Option<&'a FloorRollup>,
}

pub fn recommend_floors(ranked: &[FloorRollup]) -> FloorRecommendation<'_> {
    FloorRecommendation {
        preferred: ranked.first(),
        backup: ranked.get(1),
    }
}

/// Whole minutes elapsed since `timestamp`, rounded half-up and clamped at 0.
pub fn minutes_since(now: OffsetDateTime, timestamp: Option<OffsetDateTime>) -> Option<u64> {
    let timestamp = timestamp?;
    let elapsed_ms = (now - timestamp).whole_milliseconds().max(0) as u128;
    Some(((elapsed_ms + 30_000) / 60_000) as u64)
}

pub fn freshness_label(minutes: Option<u64>) -> String {
    match minutes {
        None => "no data".to_string(),
        Some(minutes) => format!("updated {minutes} min ago"),
    }
}
