//! Subcommand implementations

pub mod attributes;
pub mod known_empty;
pub mod scan;

use std::path::Path;

use anyhow::Context;
use heritage_engine::{HierarchyScanner, ScanConfig};
use heritage_types::TypeRegistry;

/// Load the scanner configuration, or the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

/// Load a JSON type model
pub fn load_model(path: &Path) -> anyhow::Result<TypeRegistry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    let registry = TypeRegistry::from_json_str(&json)
        .with_context(|| format!("invalid model {}", path.display()))?;
    tracing::debug!(path = %path.display(), types = registry.type_count(), "Loaded model");
    Ok(registry)
}

/// Load a model and wrap it in a scanner
pub fn open_scanner(
    model: &Path,
    config: &ScanConfig,
) -> anyhow::Result<HierarchyScanner<TypeRegistry>> {
    Ok(HierarchyScanner::with_config(load_model(model)?, config))
}
