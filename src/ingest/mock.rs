use crate::error::AppError;
use crate::ingest::ReadingSource;
use crate::reading::Reading;
use std::collections::VecDeque;

/// Scripted poll result.
#[derive(Debug, Clone)]
pub enum MockBatch {
    Readings(Vec<Reading>),
    Unchanged,
    Fail(String),
}

/// Replays scripted results in order, then reports no new batches.
#[derive(Debug, Default)]
pub struct MockReadingSource {
    script: VecDeque<MockBatch>,
    polls: usize,
}

impl MockReadingSource {
    pub fn new(script: Vec<MockBatch>) -> Self {
        Self {
            script: script.into(),
            polls: 0,
        }
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl ReadingSource for MockReadingSource {
    fn fetch_batch(&mut self) -> Result<Option<Vec<Reading>>, AppError> {
        self.polls += 1;
        match self.script.pop_front() {
            Some(MockBatch::Readings(batch)) => Ok(Some(batch)),
            Some(MockBatch::Unchanged) | None => Ok(None),
            Some(MockBatch::Fail(reason)) => Err(AppError::Source(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_script_reports_no_batch() -> Result<(), AppError> {
        let mut source = MockReadingSource::new(Vec::new());

        assert!(source.fetch_batch()?.is_none());
        assert_eq!(source.polls(), 1);
        Ok(())
    }

    #[test]
    fn failure_surfaces_as_source_error() {
        let mut source = MockReadingSource::new(vec![MockBatch::Fail("timeout".to_string())]);

        let err = source.fetch_batch().unwrap_err();

        assert_eq!(err.to_string(), "reading source error: timeout");
    }
}
