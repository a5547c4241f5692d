use smartpark::ingest::file::JsonFileSource;
use smartpark::reading::store::ReadingStore;
use smartpark::selection::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use smartpark::{api, config, ingest, state};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

fn init_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        app = %config.app.name,
        config_path = config::DEFAULT_CONFIG_PATH,
        "smartpark starting"
    );

    let catalog = config.campus_catalog()?;
    tracing::info!(
        campuses = catalog.campuses().len(),
        default = catalog.default_code(),
        "Campus catalog loaded"
    );

    let preferences: Box<dyn PreferenceStore> = match config.preference_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Persisting campus selection to file");
            Box::new(FilePreferenceStore::new(path))
        }
        None => {
            tracing::info!("No preference path configured, selection kept in memory");
            Box::new(MemoryPreferenceStore::new())
        }
    };

    let store = ReadingStore::with_capacity_limit(config.max_readings());
    let state = Arc::new(RwLock::new(state::AppState::with_store(
        catalog,
        preferences,
        store,
    )));

    let stop_flag = Arc::new(AtomicBool::new(false));
    let ingest_handle = match config.source_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Polling reading file");
            Some(ingest::spawn_ingest_thread(
                JsonFileSource::new(path),
                Arc::clone(&state),
                config.refresh_interval(),
                Arc::clone(&stop_flag),
            ))
        }
        None => {
            tracing::warn!("No reading source configured, accepting pushed batches only");
            None
        }
    };

    let app = api::router(Arc::clone(&state));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    stop_flag.store(true, Ordering::Relaxed);
    if let Some(handle) = ingest_handle
        && handle.join().is_err()
    {
        tracing::warn!("Ingest thread panicked");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::config;

    #[test]
    fn default_config_is_valid_toml() -> Result<(), Box<dyn std::error::Error>> {
        let _config = config::load_default()?;
        Ok(())
    }
}
