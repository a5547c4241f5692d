pub mod aggregation;
pub mod api;
pub mod campus;
pub mod config;
pub mod error;
pub mod ingest;
pub mod reading;
pub mod selection;
pub mod state;
