//! Catalog and geometry fixtures.
//!
//! The catalog mirrors the shape of real catalog files: string and numeric
//! period bounds, an optional time zero, and variables in display order.

#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::Arc;

use skope_session::{DatasetCatalog, GeoJson, SessionState};

pub const CATALOG_JSON: &str = r#"[
    {
        "id": "paleocar_v2",
        "title": "PaleoCAR v2",
        "timespan": { "period": { "gte": "0001", "lte": "2000", "timeZero": 0 } },
        "variables": [
            { "id": "ppt_water_year", "name": "Water-year precipitation", "units": "mm", "visible": false },
            { "id": "gdd_may_sept", "name": "Growing degree days", "units": "F", "visible": false },
            { "id": "zuni_ppt", "name": "Zuni cumulative precipitation", "visible": false }
        ]
    },
    {
        "id": "lbda_v2",
        "title": "Living Blended Drought Atlas",
        "timespan": { "period": { "gte": "0000", "lte": "2017", "timeZero": 1 } },
        "variables": [
            { "id": "palmer_modified_drought_index", "visible": true }
        ]
    },
    {
        "id": "century_bounds",
        "timespan": { "period": { "gte": "100", "lte": "200" } },
        "variables": [
            { "id": "dup" },
            { "id": "other" },
            { "id": "dup" }
        ]
    },
    {
        "id": "no_variables",
        "timespan": { "period": { "gte": 1950, "lte": 2010 } },
        "variables": []
    }
]"#;

pub static CATALOG: Lazy<Arc<DatasetCatalog>> = Lazy::new(|| {
    let catalog = DatasetCatalog::from_json_str(CATALOG_JSON).expect("fixture catalog parses");
    catalog.validate().expect("fixture catalog is valid");
    Arc::new(catalog)
});

/// A fresh session over the fixture catalog
pub fn new_session() -> SessionState {
    SessionState::with_catalog(CATALOG.clone())
}

/// A 1 x 1 degree square with its south-west corner at (lon, lat)
pub fn one_degree_square(lon: f64, lat: f64) -> GeoJson {
    GeoJson::polygon(&[
        (lon, lat),
        (lon + 1.0, lat),
        (lon + 1.0, lat + 1.0),
        (lon, lat + 1.0),
    ])
}

/// A drawn study area in the Four Corners region, as a map UI would send it
pub fn four_corners_feature() -> GeoJson {
    GeoJson::from_json_str(
        r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-109.05, 36.99],
                    [-108.05, 36.99],
                    [-108.05, 37.99],
                    [-109.05, 37.99],
                    [-109.05, 36.99]
                ]]
            }
        }"#,
    )
    .expect("fixture geometry parses")
}
