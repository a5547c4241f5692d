use crate::aggregation::resolver::ResolvedSensors;
use crate::campus::CampusCatalog;
use crate::reading::Reading;
use crate::reading::locality;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Occupancy figures shared by campus and floor rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OccupancyMetrics {
    pub total: u32,
    pub free_count: u32,
    pub occupied_count: u32,
    /// Integer percentage of free sensors, 0 when `total` is 0.
    pub free_ratio: u8,
    pub last_updated: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusRollup {
    pub code: String,
    pub display_name: String,
    pub metrics: OccupancyMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorRollup {
    pub campus_code: String,
    pub floor_code: String,
    pub metrics: OccupancyMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rollups {
    /// One entry per known campus, in catalog order.
    pub campuses: Vec<CampusRollup>,
    /// Observed floors per campus code, ordered by floor code.
    pub floors: BTreeMap<String, Vec<FloorRollup>>,
    /// Resolved sensors that could not be attributed to a known campus.
    pub unattributed: usize,
}

#[derive(Debug, Default)]
struct MetricsAccumulator {
    total: u32,
    free_count: u32,
    last_updated: Option<OffsetDateTime>,
}

impl MetricsAccumulator {
    fn add(&mut self, reading: &Reading) {
        self.total += 1;
        if reading.state.is_free() {
            self.free_count += 1;
        }
        if let Some(observed_at) = reading.observed_at {
            self.last_updated = Some(match self.last_updated {
                Some(current) if current >= observed_at => current,
                _ => observed_at,
            });
        }
    }

    fn finish(&self) -> OccupancyMetrics {
        OccupancyMetrics {
            total: self.total,
            free_count: self.free_count,
            occupied_count: self.total - self.free_count,
            free_ratio: free_ratio(self.free_count, self.total),
            last_updated: self.last_updated,
        }
    }
}

/// Percentage of free sensors rounded half-up; never divides by zero.
pub fn free_ratio(free_count: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let free = u64::from(free_count.min(total));
    let total = u64::from(total);
    ((free * 200 + total) / (2 * total)) as u8
}

/// Groups resolved sensors by campus and floor.
///
/// Every known campus gets a rollup, even without sensors. Sensors with an
/// unparseable location or an unknown campus code are left out and counted in
/// [`Rollups::unattributed`].
pub fn rollup(resolved: &ResolvedSensors, catalog: &CampusCatalog) -> Rollups {
    let mut by_campus: BTreeMap<&str, MetricsAccumulator> = BTreeMap::new();
    let mut by_floor: BTreeMap<&str, BTreeMap<String, MetricsAccumulator>> = BTreeMap::new();
    let mut unattributed = 0;

    for reading in resolved.iter() {
        let key = match locality::parse(reading.location_id.as_deref()) {
            Ok(key) => key,
            Err(_) => {
                unattributed += 1;
                continue;
            }
        };
        let Some(campus) = catalog.get(&key.campus_code) else {
            unattributed += 1;
            continue;
        };

        by_campus.entry(campus.code.as_str()).or_default().add(reading);
        by_floor
            .entry(campus.code.as_str())
            .or_default()
            .entry(key.floor_code)
            .or_default()
            .add(reading);
    }

    let campuses = catalog
        .campuses()
        .iter()
        .map(|campus| CampusRollup {
            code: campus.code.clone(),
            display_name: campus.display_name.clone(),
            metrics: by_campus
                .get(campus.code.as_str())
                .map(MetricsAccumulator::finish)
                .unwrap_or_default(),
        })
        .collect();

    let floors = by_floor
        .into_iter()
        .map(|(campus_code, floors)| {
            let rollups = floors
                .into_iter()
                .map(|(floor_code, acc)| FloorRollup {
                    campus_code: campus_code.to_string(),
                    floor_code,
                    metrics: acc.finish(),
                })
                .collect();
            (campus_code.to_string(), rollups)
        })
        .collect();

    Rollups {
        campuses,
        floors,
        unattributed,
    }
}
