//! # skope-session
//!
//! Session state for exploring geospatial datasets.
//!
//! A session tracks which dataset and variable the user picked, the study
//! area they drew on the map, the temporal range of interest, and the
//! lifecycle of the time-series request made for that selection.
//!
//! ## Architecture
//!
//! - **Catalog**: the static list of datasets a session can load
//! - **Session state**: mutations called by the loader and the map UI, and
//!   derived views read by the rendering layer
//! - **Request status**: a closed set of statuses describing the
//!   time-series request, including validation and server failures
//! - **Retrieval**: sequencing of a caller-supplied fetch through those statuses

pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod retrieval;
pub mod state;
pub mod statistics;
pub mod status;
pub mod timeseries;

pub use catalog::{DatasetCatalog, DatasetMetadata, Period, PeriodBound, Timespan, Variable};
pub use config::Config;
pub use error::{Result, SessionError};
pub use geometry::{area, GeoJson, Position};
pub use logging::{
    generate_request_id, init_tracing, log_catalog_stats, log_error, log_operation_end,
    log_operation_start, log_status_transition,
};
pub use retrieval::{retrieve_time_series, FetchError, TimeSeriesQuery};
pub use state::{select_variable, SessionSnapshot, SessionState};
pub use statistics::{Statistic, SummaryStatistics};
pub use status::{ErrorDetail, RequestStatus, Severity, StatusMessage};
pub use timeseries::TimeSeries;
