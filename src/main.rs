//! carbonarr - compose a map from a JSON recipe
//!
//! Loads the recipe, applies every layer step in order and prints the
//! resulting display tree as JSON on stdout.

use tracing::{error, info};

use carbonarr::{init_tracing, Config, Map, Result};

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    init_tracing(&config.log_level);

    info!("Starting carbonarr v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let map = Map::from_config(&config).map_err(|e| {
        error!("Failed to compose map: {}", e);
        e
    })?;

    info!(
        layers = map.layer_count(),
        controls = map.controls().len(),
        "Map composed"
    );

    let tree = map.to_json()?;
    println!("{}", serde_json::to_string_pretty(&tree)?);

    Ok(())
}
