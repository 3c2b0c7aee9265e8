//! Time-series retrieval sequencing.
//!
//! The transport is supplied by the caller as a future. This module only
//! checks the session is ready, moves the request status through its
//! lifecycle and applies the outcome. A late response from an earlier
//! request is not detected; the last status written wins.

use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::geometry::GeoJson;
use crate::logging::generate_request_id;
use crate::state::SessionState;
use crate::status::ErrorDetail;
use crate::timeseries::TimeSeries;

/// Everything the time-series service needs for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesQuery {
    pub request_id: String,
    pub dataset_id: String,
    pub variable_id: String,
    pub selected_area: GeoJson,
    pub temporal_range: [i32; 2],
}

/// A failed fetch, as reported by the transport
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The service rejected the request
    #[error("bad request ({} errors)", .0.len())]
    BadRequest(Vec<ErrorDetail>),

    /// The service failed
    #[error("server error ({} errors)", .0.len())]
    ServerError(Vec<ErrorDetail>),
}

impl SessionState {
    /// Build the query for the current dataset, variable and study area.
    ///
    /// Fails when [`SessionState::can_handle_time_series_request`] is false.
    pub fn time_series_query(&self) -> Result<TimeSeriesQuery> {
        let metadata = self
            .metadata()
            .ok_or_else(|| SessionError::precondition("no dataset loaded"))?;
        let variable = self
            .variable()
            .ok_or_else(|| SessionError::precondition("no variable selected"))?;
        let geometry = self
            .geo_json()
            .ok_or_else(|| SessionError::precondition("no study area drawn"))?;

        Ok(TimeSeriesQuery {
            request_id: generate_request_id(),
            dataset_id: metadata.id.clone(),
            variable_id: variable.id.clone(),
            selected_area: geometry.clone(),
            temporal_range: self.temporal_range(),
        })
    }
}

/// Run one time-series request against `session`.
///
/// Without a study area the status becomes `no-area` and nothing is fetched.
/// Without a dataset or variable this is a caller bug and an error is
/// returned with the status untouched. Otherwise the status goes to
/// `loading`, `fetch` is awaited for at most `timeout`, and the outcome is
/// applied: the series plus `success`, or `timeout`, `badrequest`,
/// `servererror`.
pub async fn retrieve_time_series<F, Fut>(
    session: &mut SessionState,
    timeout: Duration,
    fetch: F,
) -> Result<()>
where
    F: FnOnce(TimeSeriesQuery) -> Fut,
    Fut: Future<Output = std::result::Result<TimeSeries, FetchError>>,
{
    if session.metadata().is_none() || session.variable().is_none() {
        return Err(SessionError::precondition(
            "a dataset and variable must be selected before requesting a time series",
        ));
    }
    if !session.has_geo_json() {
        session.set_time_series_no_area();
        return Ok(());
    }

    let query = session.time_series_query()?;
    let request_id = query.request_id.clone();
    let start = Instant::now();

    debug!(
        request_id = %request_id,
        dataset_id = %query.dataset_id,
        variable_id = %query.variable_id,
        "Dispatching time-series request"
    );
    session.set_time_series_loading();

    match tokio::time::timeout(timeout, fetch(query)).await {
        Ok(Ok(series)) => {
            info!(
                request_id = %request_id,
                points = series.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Time series received"
            );
            session.set_time_series(series);
            session.set_time_series_loaded();
        }
        Ok(Err(FetchError::BadRequest(details))) => {
            session.set_time_series_bad_request(&details);
        }
        Ok(Err(FetchError::ServerError(details))) => {
            session.set_time_series_server_error(&details);
        }
        Err(_) => {
            warn!(
                request_id = %request_id,
                timeout_ms = timeout.as_millis() as u64,
                "Time-series request timed out"
            );
            session.set_time_series_timeout();
        }
    }

    Ok(())
}
