use crate::reading::{Reading, SensorId};
use std::collections::BTreeMap;

/// Current reading per sensor, keyed by sensor id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSensors {
    by_sensor: BTreeMap<SensorId, Reading>,
}

impl ResolvedSensors {
    pub fn get(&self, sensor_id: SensorId) -> Option<&Reading> {
        self.by_sensor.get(&sensor_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.by_sensor.values()
    }

    pub fn len(&self) -> usize {
        self.by_sensor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sensor.is_empty()
    }
}

/// Folds readings in arrival order, keeping the most recent one per sensor.
///
/// A reading replaces the held one when its recency is greater than or equal,
/// so among equal timestamps the later arrival wins. Missing timestamps rank
/// as the epoch and never displace a timestamped reading.
pub fn resolve_latest<'a, I>(readings: I) -> ResolvedSensors
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut by_sensor: BTreeMap<SensorId, Reading> = BTreeMap::new();
    for reading in readings {
        match by_sensor.get(&reading.sensor_id) {
            Some(held) if reading.recency() < held.recency() => {}
            _ => {
                by_sensor.insert(reading.sensor_id, reading.clone());
            }
        }
    }
    ResolvedSensors { by_sensor }
}
