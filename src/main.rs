//! skope-session - open a dataset session from the command line
//!
//! Loads the catalog, opens the requested dataset, applies an optional
//! variable and study area, and prints the resulting session as JSON.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use skope_session::{
    init_tracing, log_error, log_operation_end, log_operation_start, Config, DatasetCatalog,
    GeoJson, Result, SessionError, SessionState,
};

fn main() -> Result<()> {
    // Load configuration
    let (config, args) = Config::load()?;

    init_tracing(&config.log_level);
    info!("Starting skope-session v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let catalog_path = config.catalog.path.clone().ok_or_else(|| SessionError::Config {
        message: "No catalog given; pass --catalog or set catalog.path".to_string(),
    })?;

    let start = Instant::now();
    log_operation_start("open_session", Some(args.dataset.as_str()));

    let catalog = DatasetCatalog::from_json_file(&catalog_path).map_err(|e| {
        log_error(&e, "loading catalog");
        e
    })?;

    let mut session = SessionState::new(Arc::new(catalog), &config.session);
    session.load_default_variable(&args.dataset)?;

    if let Some(variable) = &args.variable {
        session.set_variable(variable)?;
    }

    if let Some(geometry_path) = &args.geometry {
        let geometry = read_geometry(geometry_path)?;
        let geometry_type = geometry.type_name();
        session.set_geo_json(Some(geometry));
        info!(
            geometry_type = geometry_type,
            area_km2 = %session.selected_area_in_square_km(),
            "Study area loaded"
        );
    }

    log_operation_end("open_session", start, session.can_handle_time_series_request());

    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}

fn read_geometry(path: &Path) -> Result<GeoJson> {
    let content = std::fs::read_to_string(path)?;
    GeoJson::from_json_str(&content)
}
