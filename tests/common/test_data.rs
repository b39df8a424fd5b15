//! Test data generation utilities.
//!
//! Writes GeoJSON files, shapefiles and GeoTIFF rasters with known contents.
//! The GeoJSON and shapefile fixtures describe the same two rivers so the two
//! loaders can be compared.

#![allow(dead_code)]

use serde_json::json;
use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polyline};
use std::convert::TryInto;
use std::fs::File;
use std::path::Path;
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// GeoKey directory for a geographic (EPSG:4326) raster
pub const GEOGRAPHIC_KEYS: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];

/// GeoKey directory for a Web Mercator (EPSG:3857) raster
pub const MERCATOR_KEYS: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 3857];

/// GeoKey directory for a UTM zone 43N raster
pub const UTM_KEYS: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32643];

/// `(name, [lon, lat] vertices)` of the river fixtures
pub fn rivers() -> Vec<(&'static str, Vec<[f64; 2]>)> {
    vec![
        ("Yamuna", vec![[77.2, 28.6], [77.3, 28.4], [77.5, 27.9]]),
        ("Hindon", vec![[77.4, 29.0], [77.42, 28.7], [77.45, 28.5]]),
    ]
}

/// Writes the river fixtures as a GeoJSON feature collection of line strings
pub fn create_rivers_geojson(path: &Path) -> Result<()> {
    let features: Vec<_> = rivers()
        .into_iter()
        .enumerate()
        .map(|(i, (name, vertices))| {
            json!({
                "type": "Feature",
                "properties": {"name": name, "order": i},
                "geometry": {"type": "LineString", "coordinates": vertices}
            })
        })
        .collect();

    let collection = json!({"type": "FeatureCollection", "features": features});
    std::fs::write(path, serde_json::to_string_pretty(&collection)?)?;
    Ok(())
}

/// Writes the river fixtures as a polyline shapefile with a `.dbf` table
pub fn create_rivers_shapefile(path: &Path) -> Result<()> {
    let table = TableWriterBuilder::new()
        .add_character_field("name".try_into().unwrap(), 50)
        .add_numeric_field("order".try_into().unwrap(), 10, 0);

    let mut writer = shapefile::Writer::from_path(path, table)?;
    for (i, (name, vertices)) in rivers().into_iter().enumerate() {
        let points: Vec<Point> = vertices
            .iter()
            .map(|[lon, lat]| Point::new(*lon, *lat))
            .collect();

        let mut record = Record::default();
        record.insert(
            "name".to_string(),
            FieldValue::Character(Some(name.to_string())),
        );
        record.insert("order".to_string(), FieldValue::Numeric(Some(i as f64)));
        writer.write_shape_and_record(&Polyline::new(points), &record)?;
    }

    Ok(())
}

/// Writes a float GeoTIFF whose top-left corner sits at `origin` with square pixels
pub fn create_geotiff(
    path: &Path,
    size: (u32, u32),
    origin: (f64, f64),
    pixel_size: f64,
    geokeys: &[u16],
) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image::<Gray32Float>(size.0, size.1)?;

    let scale = vec![pixel_size, pixel_size, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(33550), scale.as_slice())?;

    let tiepoint = vec![0.0, 0.0, 0.0, origin.0, origin.1, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(33922), tiepoint.as_slice())?;

    if !geokeys.is_empty() {
        image
            .encoder()
            .write_tag(Tag::Unknown(34735), geokeys)?;
    }

    // Elevation-like ramp
    let data: Vec<f32> = (0..size.0 * size.1).map(|i| 200.0 + i as f32 * 0.5).collect();
    image.write_data(&data)?;

    Ok(())
}

/// Writes a JSON map recipe
pub fn write_recipe(path: &Path, recipe: &serde_json::Value) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(recipe)?)?;
    Ok(())
}
