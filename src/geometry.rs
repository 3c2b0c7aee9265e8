//! Study-area geometry and its area on the earth's surface.
//!
//! Geometries are GeoJSON objects in geographic coordinates (longitude,
//! latitude in degrees). Areas are computed with the spherical excess of each
//! ring on a sphere of the WGS84 equatorial radius.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// WGS84 equatorial radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// A single coordinate, serialized as `[lon, lat]` or `[lon, lat, alt]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            alt: None,
        }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values.as_slice() {
            [lon, lat] => Ok(Position::new(*lon, *lat)),
            [lon, lat, alt, ..] => Ok(Position {
                lon: *lon,
                lat: *lat,
                alt: Some(*alt),
            }),
            _ => Err(format!(
                "a position needs at least 2 values, got {}",
                values.len()
            )),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        match p.alt {
            Some(alt) => vec![p.lon, p.lat, alt],
            None => vec![p.lon, p.lat],
        }
    }
}

/// A closed ring of positions
pub type Ring = Vec<Position>;

/// A GeoJSON object: any geometry, a feature, or a feature collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    /// Outer ring first, then holes
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJson>,
    },
    Feature {
        geometry: Option<Box<GeoJson>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<serde_json::Value>,
    },
    FeatureCollection {
        features: Vec<GeoJson>,
    },
}

impl GeoJson {
    /// Parse and validate a GeoJSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let geo_json: GeoJson = serde_json::from_str(json)?;
        geo_json.validate()?;
        Ok(geo_json)
    }

    /// A single-ring polygon from `(lon, lat)` pairs. The ring is closed if needed.
    pub fn polygon(ring: &[(f64, f64)]) -> Self {
        let mut positions: Ring = ring
            .iter()
            .map(|&(lon, lat)| Position::new(lon, lat))
            .collect();
        if let (Some(first), Some(last)) = (positions.first().copied(), positions.last().copied()) {
            if first.lon != last.lon || first.lat != last.lat {
                positions.push(first);
            }
        }
        GeoJson::Polygon {
            coordinates: vec![positions],
        }
    }

    /// The GeoJSON `type` member
    pub fn type_name(&self) -> &'static str {
        match self {
            GeoJson::Point { .. } => "Point",
            GeoJson::MultiPoint { .. } => "MultiPoint",
            GeoJson::LineString { .. } => "LineString",
            GeoJson::MultiLineString { .. } => "MultiLineString",
            GeoJson::Polygon { .. } => "Polygon",
            GeoJson::MultiPolygon { .. } => "MultiPolygon",
            GeoJson::GeometryCollection { .. } => "GeometryCollection",
            GeoJson::Feature { .. } => "Feature",
            GeoJson::FeatureCollection { .. } => "FeatureCollection",
        }
    }

    /// Check latitudes and polygon rings
    pub fn validate(&self) -> Result<()> {
        match self {
            GeoJson::Point { coordinates } => validate_position(coordinates),
            GeoJson::MultiPoint { coordinates } | GeoJson::LineString { coordinates } => {
                coordinates.iter().try_for_each(validate_position)
            }
            GeoJson::MultiLineString { coordinates } => coordinates
                .iter()
                .flatten()
                .try_for_each(validate_position),
            GeoJson::Polygon { coordinates } => {
                coordinates.iter().try_for_each(|r| validate_ring(r))
            }
            GeoJson::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .try_for_each(|r| validate_ring(r)),
            GeoJson::GeometryCollection { geometries } => {
                geometries.iter().try_for_each(GeoJson::validate)
            }
            GeoJson::Feature { geometry, .. } => match geometry {
                Some(geometry) => geometry.validate(),
                None => Ok(()),
            },
            GeoJson::FeatureCollection { features } => {
                features.iter().try_for_each(GeoJson::validate)
            }
        }
    }
}

fn validate_position(position: &Position) -> Result<()> {
    if !position.lon.is_finite() || !position.lat.is_finite() {
        return Err(SessionError::InvalidGeometry {
            message: format!("non-finite coordinate ({}, {})", position.lon, position.lat),
        });
    }

    // Latitude must be in the range -90 to 90
    if !(-90.0..=90.0).contains(&position.lat) {
        return Err(SessionError::InvalidGeometry {
            message: format!("latitude {} is outside -90 to 90", position.lat),
        });
    }

    Ok(())
}

fn validate_ring(ring: &[Position]) -> Result<()> {
    if ring.len() < 4 {
        return Err(SessionError::InvalidGeometry {
            message: format!("a polygon ring needs at least 4 positions, got {}", ring.len()),
        });
    }

    let (first, last) = (ring[0], ring[ring.len() - 1]);
    if first.lon != last.lon || first.lat != last.lat {
        return Err(SessionError::InvalidGeometry {
            message: "polygon ring is not closed".to_string(),
        });
    }

    ring.iter().try_for_each(validate_position)
}

/// Area of a GeoJSON object in square meters.
///
/// Points and lines have no area. Collections and features sum the areas of
/// their members. Holes are subtracted from their polygon.
pub fn area(geo_json: &GeoJson) -> f64 {
    match geo_json {
        GeoJson::Polygon { coordinates } => polygon_area(coordinates),
        GeoJson::MultiPolygon { coordinates } => {
            coordinates.iter().map(|p| polygon_area(p)).sum()
        }
        GeoJson::GeometryCollection { geometries } => geometries.iter().map(area).sum(),
        GeoJson::Feature { geometry, .. } => geometry.as_deref().map_or(0.0, area),
        GeoJson::FeatureCollection { features } => features.iter().map(area).sum(),
        GeoJson::Point { .. }
        | GeoJson::MultiPoint { .. }
        | GeoJson::LineString { .. }
        | GeoJson::MultiLineString { .. } => 0.0,
    }
}

fn polygon_area(rings: &[Ring]) -> f64 {
    let mut rings = rings.iter();
    let outer = match rings.next() {
        Some(ring) => ring_area(ring).abs(),
        None => return 0.0,
    };
    outer - rings.map(|hole| ring_area(hole).abs()).sum::<f64>()
}

/// Signed spherical-excess area of a ring.
///
/// Sums `(lon[i+1] - lon[i-1]) * sin(lat[i])` around the ring, with indices
/// wrapping, then scales by `R^2 / 2`. Clockwise rings come out positive.
fn ring_area(ring: &[Position]) -> f64 {
    let n = ring.len();
    if n <= 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };

        let p1 = ring[lower];
        let p2 = ring[middle];
        let p3 = ring[upper];
        total += (p3.lon.to_radians() - p1.lon.to_radians()) * p2.lat.to_radians().sin();
    }

    total * EARTH_RADIUS_METERS * EARTH_RADIUS_METERS / 2.0
}
