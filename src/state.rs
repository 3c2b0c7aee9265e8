//! Session state for one dataset exploration session.
//!
//! `SessionState` owns everything a session mutates: the loaded dataset and
//! its selected variable, the drawn study area, the temporal range and the
//! time-series request. All mutations are synchronous and go through
//! `&mut self`; derived values are recomputed on read, except for the study
//! area which is cached whenever the geometry changes.

use chrono::Datelike;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{DatasetCatalog, DatasetMetadata, Variable};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::geometry::{self, GeoJson};
use crate::logging::log_status_transition;
use crate::statistics::{Statistic, SummaryStatistics};
use crate::status::{ErrorDetail, RequestStatus};
use crate::timeseries::TimeSeries;

/// Storage key for the study area when no dataset is loaded
pub const DEFAULT_GEO_JSON_KEY: &str = "skope:geometry";

/// Index of the variable with the given id, or `None`.
///
/// If the list contains the id more than once, the last occurrence wins.
pub fn select_variable(variables: &[Variable], variable_id: &str) -> Option<usize> {
    variables.iter().rposition(|v| v.id == variable_id)
}

/// A dataset loaded into the session, together with its selection
#[derive(Debug, Clone)]
struct LoadedDataset {
    metadata: Arc<DatasetMetadata>,
    /// Parsed `[gte, lte]` of the dataset period
    span: [i32; 2],
    /// Index into `metadata.variables`
    selected: Option<usize>,
}

/// The state container for one session
#[derive(Debug, Clone)]
pub struct SessionState {
    catalog: Arc<DatasetCatalog>,
    dataset: Option<LoadedDataset>,
    geo_json: Option<GeoJson>,
    selected_area_in_square_meters: f64,
    temporal_range: [i32; 2],
    area_per_pixel: f64,
    timeseries: TimeSeries,
    has_data: bool,
    time_series_request_status: RequestStatus,
}

impl SessionState {
    /// Create a session with the configured defaults
    pub fn new(catalog: Arc<DatasetCatalog>, config: &SessionConfig) -> Self {
        Self {
            catalog,
            dataset: None,
            geo_json: None,
            selected_area_in_square_meters: 0.0,
            temporal_range: config.default_temporal_range,
            area_per_pixel: config.area_per_pixel,
            timeseries: TimeSeries::default(),
            has_data: false,
            time_series_request_status: RequestStatus::default(),
        }
    }

    /// Create a session with the built-in defaults
    pub fn with_catalog(catalog: Arc<DatasetCatalog>) -> Self {
        Self::new(catalog, &SessionConfig::default())
    }

    // ---------------------------------------------------------------------
    // Metadata and variable selection
    // ---------------------------------------------------------------------

    /// Load a dataset from the catalog and select its first variable.
    ///
    /// Does nothing if the dataset is already loaded. An unknown id leaves
    /// the session untouched and returns [`SessionError::MetadataNotFound`];
    /// callers that do not care can ignore it.
    pub fn load_metadata(&mut self, id: &str) -> Result<()> {
        if self.metadata().is_some_and(|m| m.id == id) {
            debug!(dataset_id = id, "Dataset already loaded");
            return Ok(());
        }

        let Some(metadata) = self.catalog.find(id) else {
            warn!(dataset_id = id, "Dataset not in catalog, session unchanged");
            return Err(SessionError::MetadataNotFound { id: id.to_string() });
        };

        self.set_metadata(metadata)?;

        if let Some(dataset) = self.dataset.as_mut() {
            if !dataset.metadata.variables.is_empty() {
                dataset.selected = Some(0);
                debug!(
                    dataset_id = id,
                    variable_id = %dataset.metadata.variables[0].id,
                    "Selected first variable"
                );
            }
        }
        Ok(())
    }

    /// Make sure a dataset is loaded, then make sure a variable is selected.
    ///
    /// The dataset is only loaded when none is; an already loaded dataset
    /// is kept even if its id differs from `id`.
    pub fn load_default_variable(&mut self, id: &str) -> Result<()> {
        if self.dataset.is_none() {
            self.load_metadata(id)?;
        }

        let dataset = self
            .dataset
            .as_mut()
            .ok_or_else(|| SessionError::precondition("no dataset loaded"))?;

        if dataset.selected.is_none() {
            if dataset.metadata.variables.is_empty() {
                return Err(SessionError::precondition(format!(
                    "dataset {} has no variables",
                    dataset.metadata.id
                )));
            }
            dataset.selected = Some(0);
        }
        Ok(())
    }

    /// Replace the loaded dataset wholesale and reset the temporal range to its period.
    ///
    /// Any previous variable selection is dropped.
    pub fn set_metadata(&mut self, metadata: Arc<DatasetMetadata>) -> Result<()> {
        let span = metadata.temporal_range()?;

        self.temporal_range = span;
        info!(
            dataset_id = %metadata.id,
            variables = metadata.variables.len(),
            start = span[0],
            end = span[1],
            "Dataset loaded"
        );
        self.dataset = Some(LoadedDataset {
            metadata,
            span,
            selected: None,
        });
        Ok(())
    }

    /// Select the variable with the given id.
    ///
    /// Requires a loaded dataset. An id that matches no variable returns
    /// [`SessionError::VariableNotFound`] and keeps the current selection.
    pub fn set_variable(&mut self, variable_id: &str) -> Result<()> {
        let dataset = self.dataset.as_mut().ok_or_else(|| {
            SessionError::precondition(format!(
                "cannot select variable {} before a dataset is loaded",
                variable_id
            ))
        })?;

        let index = select_variable(&dataset.metadata.variables, variable_id).ok_or_else(|| {
            SessionError::VariableNotFound {
                id: variable_id.to_string(),
            }
        })?;

        dataset.selected = Some(index);
        info!(
            dataset_id = %dataset.metadata.id,
            variable_id = variable_id,
            "Variable selected"
        );
        Ok(())
    }

    pub fn metadata(&self) -> Option<&Arc<DatasetMetadata>> {
        self.dataset.as_ref().map(|d| &d.metadata)
    }

    /// The selected variable
    pub fn variable(&self) -> Option<&Variable> {
        let dataset = self.dataset.as_ref()?;
        dataset.selected.and_then(|i| dataset.metadata.variables.get(i))
    }

    /// Whether the variable with this id is the selected one
    pub fn is_variable_visible(&self, variable_id: &str) -> bool {
        self.variable().is_some_and(|v| v.id == variable_id)
    }

    /// Every variable of the loaded dataset with its visibility, in catalog order.
    ///
    /// At most one entry is visible.
    pub fn variable_visibility(&self) -> Vec<(&Variable, bool)> {
        match &self.dataset {
            Some(dataset) => dataset
                .metadata
                .variables
                .iter()
                .enumerate()
                .map(|(i, v)| (v, dataset.selected == Some(i)))
                .collect(),
            None => Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Study area
    // ---------------------------------------------------------------------

    /// Store the study area and recompute its area. `None` clears it.
    pub fn set_geo_json(&mut self, geo_json: Option<GeoJson>) {
        self.selected_area_in_square_meters = geo_json.as_ref().map_or(0.0, geometry::area);
        self.geo_json = geo_json;
        debug!(
            has_geo_json = self.geo_json.is_some(),
            area_m2 = self.selected_area_in_square_meters,
            "Study area updated"
        );
    }

    pub fn clear_geo_json(&mut self) {
        self.set_geo_json(None);
    }

    pub fn geo_json(&self) -> Option<&GeoJson> {
        self.geo_json.as_ref()
    }

    pub fn has_geo_json(&self) -> bool {
        self.geo_json.is_some()
    }

    pub fn selected_area_in_square_meters(&self) -> f64 {
        self.selected_area_in_square_meters
    }

    /// The study area in km^2 with two decimals, for display.
    ///
    /// Halfway values round away from zero, so 0.125 shows as "0.13".
    pub fn selected_area_in_square_km(&self) -> String {
        let km2 = self.selected_area_in_square_meters / 1_000_000.0;
        format!("{:.2}", (km2 * 100.0).round() / 100.0)
    }

    /// Key under which the drawn study area is stored
    pub fn geo_json_key(&self) -> String {
        match self.metadata() {
            Some(metadata) => format!("geojson:{}", metadata.id),
            None => DEFAULT_GEO_JSON_KEY.to_string(),
        }
    }

    // ---------------------------------------------------------------------
    // Temporal range
    // ---------------------------------------------------------------------

    pub fn set_temporal_range(&mut self, temporal_range: [i32; 2]) {
        self.temporal_range = temporal_range;
    }

    pub fn temporal_range(&self) -> [i32; 2] {
        self.temporal_range
    }

    /// The loaded dataset's period, or `[1, current year]` without one
    pub fn timespan(&self) -> [i32; 2] {
        match &self.dataset {
            Some(dataset) => dataset.span,
            None => {
                debug!("No selected dataset, returning default year range");
                [1, chrono::Local::now().year()]
            }
        }
    }

    pub fn time_zero(&self) -> i64 {
        self.metadata().map_or(0, |m| m.time_zero())
    }

    // ---------------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------------

    pub fn set_area_per_pixel(&mut self, area_per_pixel: f64) {
        self.area_per_pixel = area_per_pixel;
    }

    pub fn area_per_pixel(&self) -> f64 {
        self.area_per_pixel
    }

    pub fn statistics(&self) -> SummaryStatistics {
        SummaryStatistics::placeholder(self.area_per_pixel)
    }

    pub fn pixel_area(&self) -> Statistic {
        self.statistics().pixel_area
    }

    pub fn number_of_pixels(&self) -> Statistic {
        self.statistics().number_of_pixels
    }

    pub fn mean(&self) -> Statistic {
        self.statistics().mean
    }

    pub fn median(&self) -> Statistic {
        self.statistics().median
    }

    pub fn std_dev(&self) -> Statistic {
        self.statistics().std_dev
    }

    // ---------------------------------------------------------------------
    // Time series
    // ---------------------------------------------------------------------

    /// Replace the series. Marks the session as having data even if it is empty.
    pub fn set_time_series(&mut self, timeseries: TimeSeries) {
        debug!(points = timeseries.len(), "Time series set");
        self.timeseries = timeseries;
        self.has_data = true;
    }

    pub fn clear_time_series(&mut self) {
        self.timeseries = TimeSeries::default();
        self.has_data = false;
    }

    pub fn timeseries(&self) -> &TimeSeries {
        &self.timeseries
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Whether a time-series request can be dispatched
    pub fn can_handle_time_series_request(&self) -> bool {
        self.metadata().is_some() && self.has_geo_json() && self.variable().is_some()
    }

    // ---------------------------------------------------------------------
    // Request status
    // ---------------------------------------------------------------------

    fn set_status(&mut self, status: RequestStatus) {
        log_status_transition(&self.time_series_request_status, &status);
        self.time_series_request_status = status;
    }

    pub fn set_time_series_loading(&mut self) {
        self.set_status(RequestStatus::Loading);
    }

    pub fn set_time_series_loaded(&mut self) {
        self.set_status(RequestStatus::Success);
    }

    pub fn set_time_series_timeout(&mut self) {
        self.set_status(RequestStatus::Timeout);
    }

    pub fn set_time_series_no_area(&mut self) {
        self.set_status(RequestStatus::NoArea);
    }

    pub fn set_time_series_bad_request(&mut self, details: &[ErrorDetail]) {
        self.set_status(RequestStatus::bad_request(details));
    }

    pub fn set_time_series_server_error(&mut self, details: &[ErrorDetail]) {
        self.set_status(RequestStatus::server_error(details));
    }

    pub fn time_series_request_status(&self) -> &RequestStatus {
        &self.time_series_request_status
    }

    pub fn is_time_series_loading(&self) -> bool {
        self.time_series_request_status.is_loading()
    }

    pub fn is_time_series_loaded(&self) -> bool {
        self.time_series_request_status.is_loaded()
    }

    /// A read-only view of the session for the rendering layer
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            dataset_id: self.metadata().map(|m| m.id.clone()),
            variable_id: self.variable().map(|v| v.id.clone()),
            has_geo_json: self.has_geo_json(),
            geo_json_key: self.geo_json_key(),
            selected_area_in_square_meters: self.selected_area_in_square_meters,
            selected_area_in_square_km: self.selected_area_in_square_km(),
            temporal_range: self.temporal_range,
            timespan: self.timespan(),
            time_zero: self.time_zero(),
            area_per_pixel: self.area_per_pixel,
            has_data: self.has_data,
            time_series_points: self.timeseries.len(),
            time_series_request_status: self.time_series_request_status.clone(),
            can_handle_time_series_request: self.can_handle_time_series_request(),
            statistics: self.statistics(),
        }
    }
}

/// Serializable view of a session and its derived values
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub dataset_id: Option<String>,
    pub variable_id: Option<String>,
    pub has_geo_json: bool,
    pub geo_json_key: String,
    pub selected_area_in_square_meters: f64,
    pub selected_area_in_square_km: String,
    pub temporal_range: [i32; 2],
    pub timespan: [i32; 2],
    pub time_zero: i64,
    pub area_per_pixel: f64,
    pub has_data: bool,
    pub time_series_points: usize,
    pub time_series_request_status: RequestStatus,
    pub can_handle_time_series_request: bool,
    pub statistics: SummaryStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Period, PeriodBound, Timespan};

    fn variable(id: &str) -> Variable {
        Variable {
            id: id.to_string(),
            name: None,
            units: None,
            visible: false,
        }
    }

    fn dataset(id: &str, gte: &str, lte: &str, variables: &[&str]) -> DatasetMetadata {
        DatasetMetadata {
            id: id.to_string(),
            title: None,
            description: None,
            timespan: Timespan {
                period: Period {
                    gte: PeriodBound::Text(gte.to_string()),
                    lte: PeriodBound::Text(lte.to_string()),
                    time_zero: None,
                },
            },
            variables: variables.iter().map(|id| variable(id)).collect(),
        }
    }

    fn session() -> SessionState {
        let catalog = DatasetCatalog::new(vec![
            dataset("paleocar", "1", "2000", &["ppt", "gdd"]),
            dataset("lbda", "-2000", "2017", &["pdsi"]),
            dataset("empty", "100", "200", &[]),
        ]);
        SessionState::with_catalog(Arc::new(catalog))
    }

    #[test]
    fn test_defaults() {
        let session = session();
        assert!(session.metadata().is_none());
        assert!(session.variable().is_none());
        assert_eq!(session.temporal_range(), [1, 2000]);
        assert_eq!(session.area_per_pixel(), 45.8);
        assert_eq!(session.selected_area_in_square_meters(), 0.0);
        assert!(session.timeseries().is_empty());
        assert!(!session.has_data());
        assert!(session.is_time_series_loading());
        assert_eq!(session.geo_json_key(), "skope:geometry");
        assert_eq!(session.time_zero(), 0);
    }

    #[test]
    fn test_select_variable_last_match_wins() {
        let variables = vec![variable("a"), variable("b"), variable("a")];
        assert_eq!(select_variable(&variables, "a"), Some(2));
        assert_eq!(select_variable(&variables, "b"), Some(1));
        assert_eq!(select_variable(&variables, "c"), None);
    }

    #[test]
    fn test_switching_dataset_replaces_selection() {
        let mut session = session();
        session.load_metadata("paleocar").unwrap();
        session.set_variable("gdd").unwrap();

        session.load_metadata("lbda").unwrap();
        assert_eq!(session.variable().unwrap().id, "pdsi");
        assert_eq!(session.temporal_range(), [-2000, 2017]);
        assert_eq!(session.geo_json_key(), "geojson:lbda");

        session.load_metadata("empty").unwrap();
        assert!(session.variable().is_none());
        assert!(session.variable_visibility().is_empty());
    }

    #[test]
    fn test_unknown_variable_keeps_selection() {
        let mut session = session();
        session.load_metadata("paleocar").unwrap();
        session.set_variable("gdd").unwrap();

        let err = session.set_variable("swe").unwrap_err();
        assert!(matches!(err, SessionError::VariableNotFound { .. }));
        assert!(session.is_variable_visible("gdd"));
        assert!(!session.is_variable_visible("ppt"));
    }

    #[test]
    fn test_set_variable_without_metadata_fails_fast() {
        let mut session = session();
        let err = session.set_variable("ppt").unwrap_err();
        assert!(matches!(err, SessionError::Precondition { .. }));
    }

    #[test]
    fn test_load_default_variable() {
        let mut session = session();
        session.load_default_variable("lbda").unwrap();
        assert_eq!(session.metadata().unwrap().id, "lbda");
        assert_eq!(session.variable().unwrap().id, "pdsi");

        // An already loaded dataset is kept even for another id
        session.load_default_variable("paleocar").unwrap();
        assert_eq!(session.metadata().unwrap().id, "lbda");

        let mut session = self::session();
        assert!(matches!(
            session.load_default_variable("empty"),
            Err(SessionError::Precondition { .. })
        ));
        assert!(matches!(
            self::session().load_default_variable("nope"),
            Err(SessionError::MetadataNotFound { .. })
        ));
    }

    #[test]
    fn test_load_default_variable_keeps_existing_selection() {
        let mut session = session();
        session.load_metadata("paleocar").unwrap();
        session.set_variable("gdd").unwrap();
        session.load_default_variable("paleocar").unwrap();
        assert_eq!(session.variable().unwrap().id, "gdd");
    }

    #[test]
    fn test_invalid_metadata_leaves_state_unchanged() {
        let mut session = session();
        session.load_metadata("paleocar").unwrap();

        let broken = Arc::new(dataset("broken", "soon", "later", &["x"]));
        assert!(matches!(
            session.set_metadata(broken),
            Err(SessionError::InvalidMetadata { .. })
        ));
        assert_eq!(session.metadata().unwrap().id, "paleocar");
        assert_eq!(session.temporal_range(), [1, 2000]);
    }

    #[test]
    fn test_temporal_range_and_area_per_pixel() {
        let mut session = session();
        session.set_temporal_range([500, 1500]);
        assert_eq!(session.temporal_range(), [500, 1500]);

        session.set_area_per_pixel(100.0);
        assert_eq!(session.pixel_area().value(), 4200.0);
        assert!(session.mean().is_placeholder());
        assert_eq!(session.median().value(), 13.0);
        assert_eq!(session.std_dev().value(), 36.2);
        assert_eq!(session.number_of_pixels().value(), 42.0);
    }

    #[test]
    fn test_time_series_is_independent_of_status() {
        let mut session = session();
        session.set_time_series(TimeSeries::default());
        assert!(session.has_data());
        assert!(session.is_time_series_loading());

        session.set_time_series(TimeSeries::new(vec![1.0, 2.0], vec![3.0, 4.0]));
        assert_eq!(session.timeseries().len(), 2);

        session.clear_time_series();
        assert!(!session.has_data());
        assert!(session.timeseries().x.is_empty());
        assert!(session.timeseries().y.is_empty());
    }

    #[test]
    fn test_status_transitions_are_permissive() {
        let mut session = session();
        session.set_time_series_loaded();
        assert!(session.is_time_series_loaded());
        session.set_time_series_no_area();
        assert_eq!(session.time_series_request_status().kind(), "no-area");
        session.set_time_series_timeout();
        session.set_time_series_server_error(&[ErrorDetail::new("boom")]);
        assert_eq!(
            session.time_series_request_status(),
            &RequestStatus::ServerError(vec!["boom".to_string()])
        );
        session.set_time_series_loading();
        assert!(session.is_time_series_loading());
    }

    #[test]
    fn test_square_km_display() {
        let mut session = session();
        assert_eq!(session.selected_area_in_square_km(), "0.00");

        session.selected_area_in_square_meters = 1_234_567.0;
        assert_eq!(session.selected_area_in_square_km(), "1.23");

        session.selected_area_in_square_meters = 125_000.0;
        assert_eq!(session.selected_area_in_square_km(), "0.13");

        session.selected_area_in_square_meters = 625_000.0;
        assert_eq!(session.selected_area_in_square_km(), "0.63");

        session.selected_area_in_square_meters = 1_994_999.0;
        assert_eq!(session.selected_area_in_square_km(), "1.99");
    }

    #[test]
    fn test_snapshot() {
        let mut session = session();
        session.load_metadata("paleocar").unwrap();
        session.set_geo_json(Some(GeoJson::polygon(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ])));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.dataset_id.as_deref(), Some("paleocar"));
        assert_eq!(snapshot.variable_id.as_deref(), Some("ppt"));
        assert!(snapshot.can_handle_time_series_request);
        assert_eq!(snapshot.selected_area_in_square_km, "12391.40");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["timespan"], serde_json::json!([1, 2000]));
        assert_eq!(json["timeSeriesRequestStatus"]["status"], "loading");
        assert_eq!(json["statistics"]["mean"]["kind"], "placeholder");
    }
}
