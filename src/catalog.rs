//! Dataset catalog.
//!
//! The catalog is a static, ordered collection of dataset metadata records.
//! Records are shared with sessions through `Arc` and are never mutated once
//! loaded.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::logging::log_catalog_stats;

/// One selectable measured quantity within a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Identifier, unique within its dataset (not enforced)
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Measurement units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Visibility as stored in the catalog. Sessions derive their own.
    #[serde(default)]
    pub visible: bool,
}

/// A year as found in catalog files: an integer, a float or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodBound {
    Number(i64),
    Float(f64),
    Text(String),
}

impl PeriodBound {
    /// Read the bound as a year.
    ///
    /// Text is read the way a lenient integer parser would: leading
    /// whitespace, an optional sign, then as many digits as are present.
    /// Anything after the digits is ignored, so `"2000-01-01"` reads as 2000.
    /// Floats are truncated toward zero.
    pub fn to_year(&self) -> Option<i32> {
        match self {
            PeriodBound::Number(n) => i32::try_from(*n).ok(),
            PeriodBound::Float(f) => {
                let t = f.trunc();
                (t.is_finite() && t >= i32::MIN as f64 && t <= i32::MAX as f64).then(|| t as i32)
            }
            PeriodBound::Text(s) => parse_leading_int(s),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i32>().ok().map(|v| v * sign)
}

/// Temporal extent of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// First year (inclusive)
    pub gte: PeriodBound,
    /// Last year (inclusive)
    pub lte: PeriodBound,
    /// Year offset used when labelling the time axis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zero: Option<PeriodBound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timespan {
    pub period: Period,
}

/// Complete catalog record for one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timespan: Timespan,
    /// Variables in catalog order
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl DatasetMetadata {
    /// The `[start, end]` years of this dataset's period
    pub fn temporal_range(&self) -> Result<[i32; 2]> {
        let period = &self.timespan.period;
        let start = period
            .gte
            .to_year()
            .ok_or_else(|| self.invalid_bound("gte", &period.gte))?;
        let end = period
            .lte
            .to_year()
            .ok_or_else(|| self.invalid_bound("lte", &period.lte))?;
        Ok([start, end])
    }

    /// The time-axis offset, 0 when the catalog does not set one or it is not a year
    pub fn time_zero(&self) -> i64 {
        self.timespan
            .period
            .time_zero
            .as_ref()
            .and_then(PeriodBound::to_year)
            .map_or(0, i64::from)
    }

    fn invalid_bound(&self, name: &str, bound: &PeriodBound) -> SessionError {
        SessionError::InvalidMetadata {
            id: self.id.clone(),
            message: format!("period bound {} is not a year: {:?}", name, bound),
        }
    }
}

/// An ordered collection of dataset records queried by exact id
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    datasets: Vec<Arc<DatasetMetadata>>,
}

impl DatasetCatalog {
    pub fn new(datasets: Vec<DatasetMetadata>) -> Self {
        Self {
            datasets: datasets.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a catalog from a JSON array of dataset records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let datasets: Vec<DatasetMetadata> = serde_json::from_str(json)?;
        Ok(Self::new(datasets))
    }

    /// Load and validate a catalog file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        catalog.validate()?;

        log_catalog_stats(
            &path.display().to_string(),
            catalog.len(),
            catalog.datasets.iter().map(|d| d.variables.len()).sum(),
        );
        Ok(catalog)
    }

    /// Find a dataset by exact id. The first match in catalog order wins.
    pub fn find(&self, id: &str) -> Option<Arc<DatasetMetadata>> {
        let found = self.datasets.iter().find(|d| d.id == id).cloned();
        debug!(dataset_id = id, found = found.is_some(), "Catalog lookup");
        found
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetMetadata> {
        self.datasets.iter().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Check that every record can be loaded into a session
    pub fn validate(&self) -> Result<()> {
        for dataset in &self.datasets {
            if dataset.id.is_empty() {
                return Err(SessionError::InvalidMetadata {
                    id: String::new(),
                    message: "dataset id cannot be empty".to_string(),
                });
            }

            let [start, end] = dataset.temporal_range()?;
            if start > end {
                return Err(SessionError::InvalidMetadata {
                    id: dataset.id.clone(),
                    message: format!("period starts after it ends ({} > {})", start, end),
                });
            }
        }

        info!(datasets = self.datasets.len(), "Catalog validated");
        Ok(())
    }
}
