use anyhow::{bail, Context};
use std::path::PathBuf;

use skope_session::{DatasetCatalog, SessionState};

fn main() -> anyhow::Result<()> {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: inspect-catalog <catalog.json>");
    };

    println!("Inspecting catalog: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let catalog = DatasetCatalog::from_json_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;

    println!("\n=== DATASETS ({}) ===", catalog.len());
    for dataset in catalog.iter() {
        let span = match dataset.temporal_range() {
            Ok([start, end]) => format!("{} to {}", start, end),
            Err(e) => format!("invalid ({})", e),
        };
        println!(
            "\n  {}{}",
            dataset.id,
            dataset
                .title
                .as_deref()
                .map(|t| format!(" - {}", t))
                .unwrap_or_default()
        );
        println!("    period: {} (time zero {})", span, dataset.time_zero());
        for variable in &dataset.variables {
            print!("    - {}", variable.id);
            if let Some(units) = &variable.units {
                print!(" [{}]", units);
            }
            println!();
        }
    }

    catalog.validate().context("catalog validation failed")?;

    // Every dataset must open cleanly in a fresh session
    let catalog = std::sync::Arc::new(catalog);
    for dataset in catalog.iter() {
        let mut session = SessionState::with_catalog(catalog.clone());
        session
            .load_metadata(&dataset.id)
            .with_context(|| format!("opening {}", dataset.id))?;
    }

    println!("\nCatalog OK");
    Ok(())
}
