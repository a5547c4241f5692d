use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campus {
    pub code: String,
    pub display_name: String,
}

impl Campus {
    pub fn new(code: &str, display_name: &str) -> Self {
        Self {
            code: code.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Ordered set of known campuses. Order sets the default campus and breaks
/// ranking ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusCatalog {
    campuses: Vec<Campus>,
}

impl CampusCatalog {
    /// Returns `None` when the list is empty.
    pub fn new(campuses: Vec<Campus>) -> Option<Self> {
        if campuses.is_empty() {
            None
        } else {
            Some(Self { campuses })
        }
    }

    pub fn campuses(&self) -> &[Campus] {
        &self.campuses
    }

    pub fn get(&self, code: &str) -> Option<&Campus> {
        self.campuses.iter().find(|campus| campus.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn default_code(&self) -> &str {
        &self.campuses[0].code
    }
}
