use crate::aggregation::{DashboardView, derive_view};
use crate::campus::CampusCatalog;
use crate::error::AppError;
use crate::reading::Reading;
use crate::reading::store::ReadingStore;
use crate::selection::{CampusSelector, PreferenceStore, SelectionState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Shared service state.
///
/// The view is an immutable snapshot replaced wholesale on every batch; the
/// selection only changes through [`AppState::apply_batch`] and
/// [`AppState::select_campus`].
#[derive(Debug)]
pub struct AppState {
    catalog: CampusCatalog,
    store: ReadingStore,
    view: Arc<DashboardView>,
    view_tx: watch::Sender<Arc<DashboardView>>,
    selector: CampusSelector,
    selection_tx: watch::Sender<SelectionState>,
    batches_applied: u64,
}

impl AppState {
    pub fn new(catalog: CampusCatalog, preferences: Box<dyn PreferenceStore>) -> Self {
        Self::with_store(catalog, preferences, ReadingStore::new())
    }

    pub fn with_store(
        catalog: CampusCatalog,
        preferences: Box<dyn PreferenceStore>,
        store: ReadingStore,
    ) -> Self {
        let mut selector = CampusSelector::new(&catalog, preferences);
        let view = Arc::new(derive_view(store.readings(), &catalog));
        selector.data_refreshed(view.best_campus().map(|c| c.code.as_str()));
        let (view_tx, _view_rx) = watch::channel(Arc::clone(&view));
        let (selection_tx, _selection_rx) = watch::channel(selector.state().clone());
        Self {
            catalog,
            store,
            view,
            view_tx,
            selector,
            selection_tx,
            batches_applied: 0,
        }
    }

    pub fn catalog(&self) -> &CampusCatalog {
        &self.catalog
    }

    pub fn view(&self) -> Arc<DashboardView> {
        Arc::clone(&self.view)
    }

    pub fn subscribe_view(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.view_tx.subscribe()
    }

    pub fn selection(&self) -> &SelectionState {
        self.selector.state()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionState> {
        self.selection_tx.subscribe()
    }

    pub fn reading_count(&self) -> usize {
        self.store.len()
    }

    pub fn batches_applied(&self) -> u64 {
        self.batches_applied
    }

    /// Appends a batch in arrival order, recomputes the view from the whole
    /// log and re-evaluates the selection before publishing.
    pub fn apply_batch(&mut self, batch: Vec<Reading>) -> Arc<DashboardView> {
        let batch_len = batch.len();
        let evicted = self.store.append_batch(batch);
        let view = Arc::new(derive_view(self.store.readings(), &self.catalog));
        let moved = self
            .selector
            .data_refreshed(view.best_campus().map(|c| c.code.as_str()));

        self.view = Arc::clone(&view);
        self.batches_applied += 1;
        self.view_tx.send_replace(Arc::clone(&view));
        if moved {
            self.selection_tx.send_replace(self.selector.state().clone());
        }

        info!(
            batch = batch_len,
            readings = self.store.len(),
            sensors = view.resolved().len(),
            evicted,
            "Applied reading batch"
        );
        if view.unattributed() > 0 {
            debug!(
                sensors = view.unattributed(),
                "Sensors without a known campus were left out of rollups"
            );
        }
        view
    }

    pub fn select_campus(&mut self, code: &str) -> Result<SelectionState, AppError> {
        self.selector.user_selects(&self.catalog, code)?;
        let state = self.selector.state().clone();
        self.selection_tx.send_replace(state.clone());
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::Campus;
    use crate::reading::OccupancyState;
    use crate::selection::{MemoryPreferenceStore, SelectionMode};
    use time::OffsetDateTime;

    fn catalog() -> CampusCatalog {
        CampusCatalog::new(vec![
            Campus::new("MON", "Monterrico"),
            Campus::new("SMG", "San Miguel"),
        ])
        .expect("non-empty catalog")
    }

    fn reading(sensor_id: i64, location: &str, state: OccupancyState, secs: i64) -> Reading {
        Reading::new(
            sensor_id,
            Some(location),
            state,
            OffsetDateTime::from_unix_timestamp(secs).ok(),
        )
    }

    fn app_state() -> AppState {
        AppState::new(catalog(), Box::new(MemoryPreferenceStore::new()))
    }

    #[test]
    fn starts_in_auto_on_default_campus_with_empty_view() {
        let state = app_state();

        assert_eq!(state.selection(), &SelectionState::auto("MON"));
        assert!(state.view().best_campus().is_none());
        assert_eq!(state.view().campuses().len(), 2);
    }

    #[test]
    fn batch_publishes_view_and_moves_auto_selection() {
        let mut state = app_state();
        let view_rx = state.subscribe_view();
        let selection_rx = state.subscribe_selection();

        state.apply_batch(vec![reading(1, "SMG-A1", OccupancyState::Free, 10)]);

        assert_eq!(state.selection().selected_campus_code, "SMG");
        assert_eq!(selection_rx.borrow().selected_campus_code, "SMG");
        assert_eq!(
            view_rx.borrow().best_campus().map(|c| c.code.clone()),
            Some("SMG".to_string())
        );
        assert_eq!(state.batches_applied(), 1);
    }

    #[test]
    fn manual_selection_survives_refresh() -> Result<(), AppError> {
        let mut state = app_state();

        state.select_campus("SMG")?;
        state.apply_batch(vec![reading(1, "MON-A1", OccupancyState::Free, 10)]);

        assert_eq!(state.selection().mode, SelectionMode::Manual);
        assert_eq!(state.selection().selected_campus_code, "SMG");
        Ok(())
    }

    #[test]
    fn batches_accumulate_across_calls() {
        let mut state = app_state();

        state.apply_batch(vec![reading(1, "MON-A1", OccupancyState::Free, 10)]);
        let view = state.apply_batch(vec![reading(1, "MON-A1", OccupancyState::Occupied, 10)]);

        assert_eq!(state.reading_count(), 2);
        let mon = view.campus("MON").map(|c| c.metrics);
        assert_eq!(mon.map(|m| m.free_count), Some(0));
        assert_eq!(mon.map(|m| m.total), Some(1));
    }

    #[test]
    fn selecting_unknown_campus_keeps_state() {
        let mut state = app_state();

        let result = state.select_campus("XYZ");

        assert!(matches!(result, Err(AppError::UnknownCampus(_))));
        assert_eq!(state.selection(), &SelectionState::auto("MON"));
    }
}
