//! Campus selection: auto-follow the top-ranked campus until the user pins one.

use crate::campus::CampusCatalog;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub selected_campus_code: String,
    pub mode: SelectionMode,
}

impl SelectionState {
    pub fn auto(code: &str) -> Self {
        Self {
            selected_campus_code: code.to_string(),
            mode: SelectionMode::Auto,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.mode == SelectionMode::Manual
    }

    /// Pins `code`. There is no way back to auto mode.
    pub fn user_selects(&mut self, code: &str) {
        self.selected_campus_code = code.to_string();
        self.mode = SelectionMode::Manual;
    }

    /// Follows `best_campus` while in auto mode. Returns whether the
    /// selection changed.
    pub fn data_refreshed(&mut self, best_campus: Option<&str>) -> bool {
        match (self.mode, best_campus) {
            (SelectionMode::Auto, Some(best)) if best != self.selected_campus_code => {
                self.selected_campus_code = best.to_string();
                true
            }
            _ => false,
        }
    }
}

/// Get/set hook for the persisted campus choice.
pub trait PreferenceStore: Send + Sync + fmt::Debug {
    fn get(&self) -> Result<Option<String>, AppError>;
    fn set(&self, campus_code: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(campus_code: &str) -> Self {
        Self {
            value: Mutex::new(Some(campus_code.to_string())),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self) -> Result<Option<String>, AppError> {
        let guard = self
            .value
            .lock()
            .map_err(|_| AppError::Preference("preference lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn set(&self, campus_code: &str) -> Result<(), AppError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| AppError::Preference("preference lock poisoned".to_string()))?;
        *guard = Some(campus_code.to_string());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PreferenceFile {
    selected_campus: String,
}

/// Stores the choice as `{"selected_campus": "..."}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self) -> Result<Option<String>, AppError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AppError::Preference(format!("read failed: {err}"))),
        };
        let file: PreferenceFile = serde_json::from_str(&contents)
            .map_err(|err| AppError::Preference(format!("parse failed: {err}")))?;
        Ok(Some(file.selected_campus))
    }

    fn set(&self, campus_code: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|err| AppError::Preference(format!("create dir failed: {err}")))?;
        }
        let payload = serde_json::to_string(&PreferenceFile {
            selected_campus: campus_code.to_string(),
        })
        .map_err(|err| AppError::Preference(format!("encode failed: {err}")))?;
        std::fs::write(&self.path, payload)
            .map_err(|err| AppError::Preference(format!("write failed: {err}")))
    }
}

/// Selection state bound to the campus catalog and a preference store.
#[derive(Debug)]
pub struct CampusSelector {
    state: SelectionState,
    store: Box<dyn PreferenceStore>,
}

impl CampusSelector {
    /// Starts in auto mode on the persisted campus if it is still known,
    /// otherwise on the catalog default.
    pub fn new(catalog: &CampusCatalog, store: Box<dyn PreferenceStore>) -> Self {
        let initial = match store.get() {
            Ok(Some(code)) if catalog.contains(&code) => code,
            Ok(Some(code)) => {
                warn!(campus = %code, "Persisted campus is not configured, using default");
                catalog.default_code().to_string()
            }
            Ok(None) => catalog.default_code().to_string(),
            Err(err) => {
                warn!(error = %err, "Failed to load persisted campus, using default");
                catalog.default_code().to_string()
            }
        };
        Self {
            state: SelectionState::auto(&initial),
            store,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Pins a known campus and persists it. A failed write is logged but the
    /// selection still applies.
    pub fn user_selects(&mut self, catalog: &CampusCatalog, code: &str) -> Result<(), AppError> {
        if !catalog.contains(code) {
            return Err(AppError::UnknownCampus(code.to_string()));
        }
        self.state.user_selects(code);
        debug!(campus = code, "Campus pinned by user");
        if let Err(err) = self.store.set(code) {
            warn!(error = %err, campus = code, "Failed to persist campus selection");
        }
        Ok(())
    }

    pub fn data_refreshed(&mut self, best_campus: Option<&str>) -> bool {
        let changed = self.state.data_refreshed(best_campus);
        if changed {
            debug!(
                campus = %self.state.selected_campus_code,
                "Auto selection moved to top-ranked campus"
            );
        }
        changed
    }
}
