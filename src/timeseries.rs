//! Time-series payload returned by the retrieval service.

use serde::{Deserialize, Serialize};

/// Paired x (time) and y (value) sequences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl TimeSeries {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Number of points, counting only complete `(x, y)` pairs
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
