use crate::error::AppError;
use crate::ingest::ReadingSource;
use crate::reading::Reading;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Polls a JSON file holding an append-only array of readings.
///
/// The file is re-read when its modification time or size changes, and only
/// the records past those already consumed form the next batch. A file that
/// now holds fewer records than were consumed has been replaced, so it is
/// ingested again from the start.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    last_seen: Option<(SystemTime, u64)>,
    consumed: usize,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_seen: None,
            consumed: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingSource for JsonFileSource {
    fn fetch_batch(&mut self) -> Result<Option<Vec<Reading>>, AppError> {
        let seen = std::fs::metadata(&self.path)
            .and_then(|meta| Ok((meta.modified()?, meta.len())))
            .map_err(|err| AppError::Source(format!("{}: {err}", self.path.display())))?;
        if self.last_seen == Some(seen) {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::Source(format!("{}: {err}", self.path.display())))?;
        let mut records: Vec<Reading> = serde_json::from_str(&contents)
            .map_err(|err| AppError::Source(format!("malformed batch: {err}")))?;
        self.last_seen = Some(seen);

        if records.len() < self.consumed {
            info!(
                path = %self.path.display(),
                records = records.len(),
                consumed = self.consumed,
                "Reading file was replaced, ingesting from the start"
            );
            self.consumed = 0;
        }
        let batch = records.split_off(self.consumed);
        self.consumed += batch.len();
        if batch.is_empty() {
            return Ok(None);
        }

        debug!(path = %self.path.display(), readings = batch.len(), "Loaded reading batch");
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::{Campus, CampusCatalog};
    use crate::ingest::{IngestOutcome, run_ingest_cycle};
    use crate::reading::OccupancyState;
    use crate::selection::MemoryPreferenceStore;
    use crate::state::AppState;
    use std::sync::{Arc, RwLock};
    use std::time::UNIX_EPOCH;

    #[test]
    fn reads_batch_once_until_file_changes() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("smartpark-batch-{unique}.json"));
        std::fs::write(
            &path,
            r#"[
                {"sensor_id": 1001, "estacionamiento_id": "MON-A1", "estado": "libre", "created_at": "2026-01-11T12:30:00Z"},
                {"sensor_id": 1002, "location_id": "MON-B1", "state": "occupied"}
            ]"#,
        )?;
        let mut source = JsonFileSource::new(&path);

        let first = source.fetch_batch()?;
        let second = source.fetch_batch()?;
        let _ = std::fs::remove_file(&path);

        let batch = first.ok_or("expected a batch")?;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].state, OccupancyState::Free);
        assert_eq!(batch[1].observed_at, None);
        assert!(second.is_none());
        Ok(())
    }

    #[test]
    fn appended_records_form_the_next_batch() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("smartpark-append-{unique}.json"));
        std::fs::write(
            &path,
            r#"[{"sensor_id": 1, "location_id": "MON-A1", "state": "free"}]"#,
        )?;
        let mut source = JsonFileSource::new(&path);

        let first = source.fetch_batch()?;
        std::fs::write(
            &path,
            r#"[
                {"sensor_id": 1, "location_id": "MON-A1", "state": "free"},
                {"sensor_id": 2, "location_id": "MON-B1", "state": "occupied"}
            ]"#,
        )?;
        let second = source.fetch_batch()?;
        let _ = std::fs::remove_file(&path);

        assert_eq!(first.map(|batch| batch.len()), Some(1));
        let batch = second.ok_or("expected the appended reading")?;
        let ids: Vec<_> = batch.iter().map(|r| r.sensor_id).collect();
        assert_eq!(ids, vec![2]);
        Ok(())
    }

    #[test]
    fn growing_file_adds_only_new_readings_to_state() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("smartpark-grow-{unique}.json"));
        let catalog = CampusCatalog::new(vec![Campus::new("MON", "Monterrico")])
            .ok_or("empty catalog")?;
        let state = Arc::new(RwLock::new(AppState::new(
            catalog,
            Box::new(MemoryPreferenceStore::new()),
        )));
        let mut source = JsonFileSource::new(&path);

        std::fs::write(&path, r#"[{"sensor_id": 1, "location_id": "MON-A1", "state": "free"}]"#)?;
        run_ingest_cycle(&mut source, &state)?;
        std::fs::write(
            &path,
            r#"[
                {"sensor_id": 1, "location_id": "MON-A1", "state": "free"},
                {"sensor_id": 2, "location_id": "MON-A1", "state": "free"}
            ]"#,
        )?;
        let outcome = run_ingest_cycle(&mut source, &state)?;
        let _ = std::fs::remove_file(&path);

        assert_eq!(outcome, IngestOutcome::Applied { readings: 1 });
        let guard = state.read().map_err(|_| AppError::StateLock)?;
        assert_eq!(guard.reading_count(), 2);
        assert_eq!(guard.view().resolved().len(), 2);
        Ok(())
    }

    #[test]
    fn replaced_file_is_ingested_from_the_start() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("smartpark-rotate-{unique}.json"));
        std::fs::write(
            &path,
            r#"[
                {"sensor_id": 1, "location_id": "MON-A1", "state": "free"},
                {"sensor_id": 2, "location_id": "MON-B1", "state": "free"}
            ]"#,
        )?;
        let mut source = JsonFileSource::new(&path);

        source.fetch_batch()?;
        std::fs::write(&path, r#"[{"sensor_id": 9, "location_id": "SMG-A1", "state": "occupied"}]"#)?;
        let rotated = source.fetch_batch()?;
        let _ = std::fs::remove_file(&path);

        let batch = rotated.ok_or("expected the replacement reading")?;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].sensor_id, 9);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_source_error() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("smartpark-missing-{unique}.json"));

        let result = JsonFileSource::new(&path).fetch_batch();

        assert!(matches!(result, Err(AppError::Source(_))));
        Ok(())
    }

    #[test]
    fn malformed_payload_is_a_source_error() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("smartpark-malformed-{unique}.json"));
        std::fs::write(&path, r#"{"sensor_id": "abc"}"#)?;

        let result = JsonFileSource::new(&path).fetch_batch();
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::Source(_))));
        Ok(())
    }
}
