//! Pure derivation of the dashboard view from the full reading log.
//!
//! Every batch triggers a complete recomputation: readings are resolved to one
//! state per sensor, rolled up per campus and floor, then ranked. No state is
//! carried between runs, so identical inputs always give identical views.

use crate::campus::CampusCatalog;
use crate::reading::Reading;
use std::collections::BTreeMap;

pub mod ranking;
pub mod resolver;
pub mod rollup;

use ranking::{
    FloorRecommendation, alternative_campus, best_campus, rank_campuses, rank_floors,
    recommend_floors,
};
use resolver::{ResolvedSensors, resolve_latest};
use rollup::{CampusRollup, FloorRollup, rollup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkTotals {
    pub free_count: u32,
    pub total: u32,
}

/// Immutable snapshot consumed by presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardView {
    resolved: ResolvedSensors,
    campuses: Vec<CampusRollup>,
    ranked_campuses: Vec<CampusRollup>,
    ranked_floors: BTreeMap<String, Vec<FloorRollup>>,
    unattributed: usize,
}

pub fn derive_view(readings: &[Reading], catalog: &CampusCatalog) -> DashboardView {
    let resolved = resolve_latest(readings);
    let rollups = rollup(&resolved, catalog);
    let ranked_campuses = rank_campuses(&rollups.campuses);
    let ranked_floors = rollups
        .floors
        .iter()
        .map(|(code, floors)| (code.clone(), rank_floors(floors)))
        .collect();

    DashboardView {
        resolved,
        campuses: rollups.campuses,
        ranked_campuses,
        ranked_floors,
        unattributed: rollups.unattributed,
    }
}

impl DashboardView {
    pub fn resolved(&self) -> &ResolvedSensors {
        &self.resolved
    }

    /// Campus rollups in catalog order.
    pub fn campuses(&self) -> &[CampusRollup] {
        &self.campuses
    }

    pub fn campus(&self, code: &str) -> Option<&CampusRollup> {
        self.campuses.iter().find(|campus| campus.code == code)
    }

    pub fn ranked_campuses(&self) -> &[CampusRollup] {
        &self.ranked_campuses
    }

    pub fn best_campus(&self) -> Option<&CampusRollup> {
        best_campus(&self.ranked_campuses)
    }

    pub fn alternative_campus(&self, selected: &str) -> Option<&CampusRollup> {
        alternative_campus(&self.ranked_campuses, selected)
    }

    /// Observed floors of a campus, most free spaces first.
    pub fn ranked_floors(&self, campus_code: &str) -> &[FloorRollup] {
        self.ranked_floors
            .get(campus_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn floor_recommendation(&self, campus_code: &str) -> FloorRecommendation<'_> {
        recommend_floors(self.ranked_floors(campus_code))
    }

    /// Resolved sensors located in a campus, free ones first, then by
    /// location id and sensor id.
    pub fn sensors_for_campus(&self, campus_code: &str) -> Vec<&Reading> {
        let mut sensors: Vec<&Reading> = self
            .resolved
            .iter()
            .filter(|reading| {
                crate::reading::locality::parse(reading.location_id.as_deref())
                    .is_ok_and(|key| key.campus_code == campus_code)
            })
            .collect();
        sensors.sort_by(|a, b| {
            b.state
                .is_free()
                .cmp(&a.state.is_free())
                .then_with(|| a.location_id.cmp(&b.location_id))
                .then_with(|| a.sensor_id.cmp(&b.sensor_id))
        });
        sensors
    }

    pub fn totals(&self) -> NetworkTotals {
        self.campuses
            .iter()
            .fold(NetworkTotals::default(), |acc, campus| NetworkTotals {
                free_count: acc.free_count + campus.metrics.free_count,
                total: acc.total + campus.metrics.total,
            })
    }

    pub fn unattributed(&self) -> usize {
        self.unattributed
    }
}
