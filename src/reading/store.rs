use crate::reading::{Reading, SensorId};
use std::collections::{HashMap, HashSet};

/// Append-only log of readings in arrival order.
///
/// Batches are appended as received and never reordered, since arrival order
/// decides ties during resolution. An optional cap compacts the log: only
/// readings superseded by a sensor's current winner are evicted, oldest first,
/// so resolving the compacted log gives the same result as the full one. The
/// cap is soft and is exceeded when there are more sensors than it allows.
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    readings: Vec<Reading>,
    max_readings: Option<usize>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(max_readings: Option<usize>) -> Self {
        Self {
            readings: Vec::new(),
            max_readings: max_readings.filter(|limit| *limit > 0),
        }
    }

    /// Appends a batch and returns the number of evicted readings.
    pub fn append_batch(&mut self, batch: Vec<Reading>) -> usize {
        self.readings.extend(batch);
        match self.max_readings {
            Some(limit) if self.readings.len() > limit => self.compact(limit),
            _ => 0,
        }
    }

    fn compact(&mut self, limit: usize) -> usize {
        let winners = self.winner_positions();
        let before = self.readings.len();
        let mut excess = before - limit;
        let mut position = 0;
        self.readings.retain(|_| {
            let keep = excess == 0 || winners.contains(&position);
            position += 1;
            if !keep {
                excess -= 1;
            }
            keep
        });
        before - self.readings.len()
    }

    /// Positions of the reading each sensor currently resolves to: the last
    /// arrival among those with the highest recency.
    fn winner_positions(&self) -> HashSet<usize> {
        let mut winners: HashMap<SensorId, usize> = HashMap::new();
        for (position, reading) in self.readings.iter().enumerate() {
            match winners.get(&reading.sensor_id) {
                Some(&held) if reading.recency() < self.readings[held].recency() => {}
                _ => {
                    winners.insert(reading.sensor_id, position);
                }
            }
        }
        winners.into_values().collect()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
