//! Lifecycle of a time-series request as seen by the rendering layer.
//!
//! Transitions are driven entirely by the caller. Any status may follow any
//! other; the conventional order is `loading` followed by one of the outcomes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

const LOADING_MESSAGE: &str = "Loading time series data.";
const SUCCESS_MESSAGE: &str = "Success";
const TIMEOUT_MESSAGE: &str = "Timeout exceeded, please try again with a smaller study area.";
const NO_AREA_MESSAGE: &str = "Please enter a study area.";

/// How a status should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One human-readable line attached to a status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub value: String,
}

impl StatusMessage {
    fn new(severity: Severity, value: impl Into<String>) -> Self {
        Self {
            severity,
            value: value.into(),
        }
    }
}

/// A field-level error reported by the time-series service.
///
/// Mirrors the validation error shape `{ "loc": [...], "msg": "...", "type": "..." }`.
/// Only `msg` is shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorDetail {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            loc: Vec::new(),
            msg: msg.into(),
            kind: None,
        }
    }
}

/// Status of the current time-series request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    /// A request is in flight. Also the initial status.
    #[default]
    Loading,
    /// Data arrived and was applied
    Success,
    /// The request exceeded its time budget
    Timeout,
    /// A request was attempted without a study area
    NoArea,
    /// The service rejected the request; one message per field error
    BadRequest(Vec<String>),
    /// The service failed; one message per reported error
    ServerError(Vec<String>),
}

impl RequestStatus {
    pub fn bad_request(details: &[ErrorDetail]) -> Self {
        RequestStatus::BadRequest(details.iter().map(|d| d.msg.clone()).collect())
    }

    pub fn server_error(details: &[ErrorDetail]) -> Self {
        RequestStatus::ServerError(details.iter().map(|d| d.msg.clone()).collect())
    }

    /// The status tag used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            RequestStatus::Loading => "loading",
            RequestStatus::Success => "success",
            RequestStatus::Timeout => "timeout",
            RequestStatus::NoArea => "no-area",
            RequestStatus::BadRequest(_) => "badrequest",
            RequestStatus::ServerError(_) => "servererror",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RequestStatus::Loading | RequestStatus::Success => Severity::Info,
            RequestStatus::Timeout | RequestStatus::NoArea => Severity::Warning,
            RequestStatus::BadRequest(_) | RequestStatus::ServerError(_) => Severity::Error,
        }
    }

    pub fn messages(&self) -> Vec<StatusMessage> {
        match self {
            RequestStatus::Loading => vec![StatusMessage::new(Severity::Info, LOADING_MESSAGE)],
            RequestStatus::Success => vec![StatusMessage::new(Severity::Info, SUCCESS_MESSAGE)],
            RequestStatus::Timeout => vec![StatusMessage::new(Severity::Warning, TIMEOUT_MESSAGE)],
            RequestStatus::NoArea => vec![StatusMessage::new(Severity::Warning, NO_AREA_MESSAGE)],
            RequestStatus::BadRequest(messages) | RequestStatus::ServerError(messages) => messages
                .iter()
                .map(|m| StatusMessage::new(Severity::Error, m.as_str()))
                .collect(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, RequestStatus::Success)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Serialized as `{ "status": ..., "type": ..., "messages": [...] }`
impl Serialize for RequestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RequestStatus", 3)?;
        state.serialize_field("status", self.kind())?;
        state.serialize_field("type", &self.severity())?;
        state.serialize_field("messages", &self.messages())?;
        state.end()
    }
}
