use anyhow::{bail, Context, Result};
use geojson::Value;
use std::path::Path;

use carbonarr::raster::read_geotiff_metadata;
use carbonarr::vector_loader::{load_vector, total_bounds};

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn main() -> Result<()> {
    let Some(arg) = std::env::args().nth(1) else {
        bail!("usage: inspect_layer <file.geojson|file.shp|file.tif>");
    };
    let path = Path::new(&arg);

    println!("Inspecting layer file: {}", path.display());

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "tif" | "tiff" => {
            let metadata = read_geotiff_metadata(path)
                .with_context(|| format!("reading raster {}", path.display()))?;
            let bounds = metadata.bounds_lon_lat();

            println!("\n=== RASTER ===");
            println!("  Size: {} x {}", metadata.width, metadata.height);
            println!("  CRS: {}", metadata.crs);
            println!("  Native bounds: {:?}", metadata.native_bounds.to_array());
            println!("  Bounds (deg): {:?}", bounds.to_array());
            println!("  Center [lat, lon]: {:?}", bounds.center_lat_lon());
            println!("  Default zoom: {}", carbonarr::geoutil::fit_zoom(&bounds));
        }
        _ => {
            let collection = load_vector(path)
                .with_context(|| format!("reading vector data {}", path.display()))?;

            println!("\n=== VECTOR ===");
            println!("  Features: {}", collection.features.len());
            match total_bounds(&collection) {
                Some(bounds) => println!("  Total bounds: {:?}", bounds.to_array()),
                None => println!("  Total bounds: (no coordinates)"),
            }

            println!("\nFirst features:");
            for (i, feature) in collection.features.iter().take(5).enumerate() {
                let geometry = feature
                    .geometry
                    .as_ref()
                    .map(|g| geometry_type(&g.value))
                    .unwrap_or("null");
                let properties = feature
                    .properties
                    .as_ref()
                    .map(|p| serde_json::Value::Object(p.clone()).to_string())
                    .unwrap_or_else(|| "{}".to_string());
                println!("  #{} {} {}", i, geometry, properties);
            }
        }
    }

    Ok(())
}
