//! Vector data loading.
//!
//! Reads GeoJSON documents and ESRI shapefiles into GeoJSON feature
//! collections, the one representation vector layers hold.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::json;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{CarbonarrError, Result};
use crate::geoutil::Bounds;
use crate::layer::JsonObject;

/// On-disk vector formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    GeoJson,
    Shapefile,
}

impl VectorFormat {
    /// Pick the format from the file extension; anything but `.shp` is GeoJSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("shp") => VectorFormat::Shapefile,
            _ => VectorFormat::GeoJson,
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CarbonarrError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Load any supported vector file into a feature collection
pub fn load_vector(path: &Path) -> Result<FeatureCollection> {
    match VectorFormat::from_path(path) {
        VectorFormat::GeoJson => load_geojson(path),
        VectorFormat::Shapefile => load_shapefile(path),
    }
}

/// Load a GeoJSON file
pub fn load_geojson(path: &Path) -> Result<FeatureCollection> {
    ensure_exists(path)?;

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| CarbonarrError::Parse {
        message: format!("Invalid GeoJSON: not UTF-8 text ({})", e.utf8_error()),
    })?;
    let collection = parse_geojson(&text)?;

    info!(
        path = %path.display(),
        features = collection.features.len(),
        "Loaded GeoJSON"
    );

    Ok(collection)
}

/// Parse GeoJSON text, wrapping a bare Feature or Geometry into a collection
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = text.parse().map_err(|e| CarbonarrError::Parse {
        message: format!("Invalid GeoJSON: {}", e),
    })?;

    let collection = match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => collection_of(vec![feature]),
        GeoJson::Geometry(geometry) => collection_of(vec![feature_of(Some(geometry), None)]),
    };

    Ok(collection)
}

fn collection_of(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature_of(geometry: Option<Geometry>, properties: Option<JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Load a shapefile, with attributes from the sibling `.dbf` when present
pub fn load_shapefile(path: &Path) -> Result<FeatureCollection> {
    ensure_exists(path)?;

    let dbf_path = path.with_extension("dbf");
    let mut features = Vec::new();

    if dbf_path.exists() {
        let mut reader = shapefile::Reader::from_path(path).map_err(shapefile_error)?;
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.map_err(shapefile_error)?;
            features.push(feature_of(
                shape_to_geometry(&shape),
                Some(record_to_properties(record)),
            ));
        }
    } else {
        warn!(
            path = %path.display(),
            "No .dbf attribute table next to shapefile, features will have no properties"
        );
        let mut reader = shapefile::ShapeReader::from_path(path).map_err(shapefile_error)?;
        for result in reader.iter_shapes() {
            let shape = result.map_err(shapefile_error)?;
            features.push(feature_of(shape_to_geometry(&shape), None));
        }
    }

    info!(
        path = %path.display(),
        features = features.len(),
        "Loaded shapefile"
    );

    Ok(collection_of(features))
}

fn shapefile_error(e: shapefile::Error) -> CarbonarrError {
    CarbonarrError::Parse {
        message: format!("Invalid shapefile: {}", e),
    }
}

/// Anything with planar coordinates
trait Planar {
    fn position(&self) -> Vec<f64>;
}

impl Planar for shapefile::Point {
    fn position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl Planar for shapefile::PointM {
    fn position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl Planar for shapefile::PointZ {
    fn position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

fn positions<P: Planar>(points: &[P]) -> Vec<Vec<f64>> {
    points.iter().map(Planar::position).collect()
}

fn multipoint_value<P: Planar>(points: &[P]) -> Value {
    Value::MultiPoint(positions(points))
}

fn polyline_value<P: Planar>(parts: &[Vec<P>]) -> Value {
    match parts {
        [single] => Value::LineString(positions(single)),
        _ => Value::MultiLineString(parts.iter().map(|part| positions(part)).collect()),
    }
}

/// Outer rings open a new polygon; inner rings attach to the last one
fn polygon_value<P: Planar>(rings: &[PolygonRing<P>]) -> Value {
    let mut polygons: Vec<Vec<Vec<Vec<f64>>>> = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push(vec![positions(points)]),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some(polygon) => polygon.push(positions(points)),
                None => {
                    warn!("Shapefile polygon starts with an inner ring, treating it as outer");
                    polygons.push(vec![positions(points)]);
                }
            },
        }
    }

    if polygons.len() == 1 {
        Value::Polygon(polygons.remove(0))
    } else {
        Value::MultiPolygon(polygons)
    }
}

/// Convert a shape to a 2D GeoJSON geometry; null and multipatch shapes have none
fn shape_to_geometry(shape: &Shape) -> Option<Geometry> {
    let value = match shape {
        Shape::NullShape => return None,
        Shape::Point(p) => Value::Point(p.position()),
        Shape::PointM(p) => Value::Point(p.position()),
        Shape::PointZ(p) => Value::Point(p.position()),
        Shape::Multipoint(mp) => multipoint_value(mp.points()),
        Shape::MultipointM(mp) => multipoint_value(mp.points()),
        Shape::MultipointZ(mp) => multipoint_value(mp.points()),
        Shape::Polyline(pl) => polyline_value(pl.parts()),
        Shape::PolylineM(pl) => polyline_value(pl.parts()),
        Shape::PolylineZ(pl) => polyline_value(pl.parts()),
        Shape::Polygon(poly) => polygon_value(poly.rings()),
        Shape::PolygonM(poly) => polygon_value(poly.rings()),
        Shape::PolygonZ(poly) => polygon_value(poly.rings()),
        Shape::Multipatch(_) => {
            debug!("Skipping multipatch geometry");
            return None;
        }
    };
    Some(Geometry::new(value))
}

fn field_to_json(value: FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Character(text) => text
            .map(|s| json!(s.trim()))
            .unwrap_or(serde_json::Value::Null),
        FieldValue::Memo(text) => json!(text),
        FieldValue::Numeric(number) => json!(number),
        FieldValue::Float(number) => json!(number),
        FieldValue::Double(number) => json!(number),
        FieldValue::Currency(number) => json!(number),
        FieldValue::Integer(number) => json!(number),
        FieldValue::Logical(flag) => json!(flag),
        FieldValue::Date(Some(date)) => json!(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        FieldValue::Date(None) => serde_json::Value::Null,
        other => json!(format!("{:?}", other)),
    }
}

fn record_to_properties(record: Record) -> JsonObject {
    HashMap::<String, FieldValue>::from(record)
        .into_iter()
        .map(|(name, value)| (name, field_to_json(value)))
        .collect()
}

/// Every `[x, y]` position in a geometry, in document order
pub fn geometry_positions(value: &Value) -> Vec<[f64; 2]> {
    fn push(out: &mut Vec<[f64; 2]>, position: &[f64]) {
        if position.len() >= 2 {
            out.push([position[0], position[1]]);
        }
    }

    let mut out = Vec::new();
    match value {
        Value::Point(p) => push(&mut out, p),
        Value::MultiPoint(points) | Value::LineString(points) => {
            points.iter().for_each(|p| push(&mut out, p))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines
            .iter()
            .flatten()
            .for_each(|p| push(&mut out, p)),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .flatten()
            .for_each(|p| push(&mut out, p)),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                out.extend(geometry_positions(&geometry.value));
            }
        }
    }
    out
}

/// Every position of every feature in a collection
pub fn collection_positions(collection: &FeatureCollection) -> Vec<[f64; 2]> {
    collection
        .features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .flat_map(|geometry| geometry_positions(&geometry.value))
        .collect()
}

/// `[min_x, min_y, max_x, max_y]` over a whole collection
pub fn total_bounds(collection: &FeatureCollection) -> Option<Bounds> {
    Bounds::from_points(collection_positions(collection))
}

/// Write a shapefile (with attribute table) for tests
#[cfg(test)]
pub(crate) fn create_test_shapefile(path: &Path) -> std::result::Result<(), shapefile::Error> {
    use shapefile::dbase::TableWriterBuilder;
    use shapefile::{Point, Polyline};
    use std::convert::TryInto;

    let table = TableWriterBuilder::new()
        .add_character_field("name".try_into().unwrap(), 50)
        .add_numeric_field("value".try_into().unwrap(), 10, 2);

    let mut writer = shapefile::Writer::from_path(path, table)?;

    let lines = [
        ("river", vec![Point::new(77.0, 27.0), Point::new(77.5, 27.5)]),
        ("canal", vec![Point::new(78.0, 28.0), Point::new(78.5, 28.25)]),
    ];
    for (i, (name, points)) in lines.into_iter().enumerate() {
        let mut record = Record::default();
        record.insert(
            "name".to_string(),
            FieldValue::Character(Some(name.to_string())),
        );
        record.insert("value".to_string(), FieldValue::Numeric(Some(i as f64)));
        writer.write_shape_and_record(&Polyline::new(points), &record)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TWO_POINTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "a"},
             "geometry": {"type": "Point", "coordinates": [77.3, 27.48]}},
            {"type": "Feature", "properties": {"name": "b"},
             "geometry": {"type": "Point", "coordinates": [77.5, 27.1]}}
        ]
    }"#;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            VectorFormat::from_path(Path::new("rivers.shp")),
            VectorFormat::Shapefile
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("RIVERS.SHP")),
            VectorFormat::Shapefile
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("rivers.geojson")),
            VectorFormat::GeoJson
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("rivers")),
            VectorFormat::GeoJson
        );
    }

    #[test]
    fn test_parse_feature_collection() {
        let collection = parse_geojson(TWO_POINTS).unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn test_parse_wraps_bare_documents() {
        let feature = r#"{"type": "Feature", "properties": null,
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}"#;
        assert_eq!(parse_geojson(feature).unwrap().features.len(), 1);

        let geometry = r#"{"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}"#;
        let collection = parse_geojson(geometry).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection_positions(&collection),
            vec![[1.0, 2.0], [3.0, 4.0]]
        );
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_geojson("{not json"),
            Err(CarbonarrError::Parse { .. })
        ));
        assert!(matches!(
            parse_geojson(r#"{"type": "Spaceship"}"#),
            Err(CarbonarrError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_utf8_geojson_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.geojson");
        let mut bytes =
            br#"{"type": "Point", "coordinates": [77.3, 27.48], "x": ""#.to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(br#""}"#);
        std::fs::write(&path, bytes).unwrap();

        match load_geojson(&path) {
            Err(CarbonarrError::Parse { message }) => assert!(message.contains("UTF-8")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_file_not_found() {
        for path in ["/nonexistent/a.geojson", "/nonexistent/a.shp"] {
            match load_vector(Path::new(path)) {
                Err(CarbonarrError::FileNotFound { .. }) => {}
                other => panic!("Expected FileNotFound for {}, got {:?}", path, other),
            }
        }
    }

    #[test]
    fn test_total_bounds() {
        let collection = parse_geojson(TWO_POINTS).unwrap();
        let bounds = total_bounds(&collection).unwrap();
        assert_eq!(bounds.to_array(), [77.3, 27.1, 77.5, 27.48]);

        assert!(total_bounds(&collection_of(Vec::new())).is_none());
    }

    #[test]
    fn test_polygon_rings() {
        let square = |offset: f64| {
            vec![
                shapefile::Point::new(offset, offset),
                shapefile::Point::new(offset, offset + 1.0),
                shapefile::Point::new(offset + 1.0, offset + 1.0),
                shapefile::Point::new(offset, offset),
            ]
        };

        let single = polygon_value(&[PolygonRing::Outer(square(0.0)), PolygonRing::Inner(square(0.25))]);
        match single {
            Value::Polygon(rings) => assert_eq!(rings.len(), 2),
            other => panic!("Expected Polygon, got {:?}", other),
        }

        let multi = polygon_value(&[PolygonRing::Outer(square(0.0)), PolygonRing::Outer(square(5.0))]);
        match multi {
            Value::MultiPolygon(polygons) => assert_eq!(polygons.len(), 2),
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_shapefile_loading() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.shp");
        create_test_shapefile(&path).unwrap();

        let collection = load_shapefile(&path).unwrap();
        assert_eq!(collection.features.len(), 2);

        let first = &collection.features[0];
        let properties = first.properties.as_ref().unwrap();
        assert_eq!(properties.get("name"), Some(&json!("river")));
        assert_eq!(properties.get("value"), Some(&json!(0.0)));

        match &first.geometry.as_ref().unwrap().value {
            Value::LineString(points) => {
                assert_eq!(points, &vec![vec![77.0, 27.0], vec![77.5, 27.5]])
            }
            other => panic!("Expected LineString, got {:?}", other),
        }
    }

    #[test]
    fn test_shapefile_without_dbf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.shp");
        create_test_shapefile(&path).unwrap();
        std::fs::remove_file(path.with_extension("dbf")).unwrap();

        let collection = load_shapefile(&path).unwrap();
        assert_eq!(collection.features.len(), 2);
        assert!(collection.features[0].properties.is_none());
    }
}
