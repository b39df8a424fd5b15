//! GeoTIFF raster provider.
//!
//! Uses the `tiff` crate to read the image header and the GeoTIFF tags
//! (ModelPixelScale + ModelTiepoint, or ModelTransformation) together with
//! the GeoKey directory that names the coordinate system.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::{debug, info};

use super::{Crs, RasterProvider, RasterSource};
use crate::error::{CarbonarrError, Result};
use crate::geoutil::{self, Bounds};
use crate::layer::RasterLayerOptions;

const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const MODEL_TRANSFORMATION_TAG: u16 = 34264;
const GEO_KEY_DIRECTORY_TAG: u16 = 34735;

const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;

/// EPSG codes that denote spherical Web Mercator
const WEB_MERCATOR_CODES: [u16; 2] = [3857, 3785];

/// Georeferencing read from a GeoTIFF header
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffMetadata {
    pub width: u32,
    pub height: u32,
    /// Extent in the file's own CRS units
    pub native_bounds: Bounds,
    pub crs: Crs,
}

impl GeoTiffMetadata {
    /// Extent in degrees
    pub fn bounds_lon_lat(&self) -> Bounds {
        match self.crs {
            Crs::Geographic => self.native_bounds,
            Crs::WebMercator => geoutil::web_mercator_bounds_to_lon_lat(&self.native_bounds),
        }
    }
}

fn raster_error(context: &str, e: impl std::fmt::Display) -> CarbonarrError {
    CarbonarrError::Raster {
        message: format!("{}: {}", context, e),
    }
}

/// Read the georeferencing of a GeoTIFF file without decoding its pixels
pub fn read_geotiff_metadata(path: &Path) -> Result<GeoTiffMetadata> {
    if !path.exists() {
        return Err(CarbonarrError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let mut decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| raster_error("TIFF decode error", e))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| raster_error("Cannot read dimensions", e))?;

    debug!(
        path = %path.display(),
        width = width,
        height = height,
        "Opened TIFF header"
    );

    let native_bounds = read_native_bounds(&mut decoder, width, height)?;
    let geokeys = read_u16_tag(&mut decoder, GEO_KEY_DIRECTORY_TAG)?;
    let crs = detect_crs(geokeys.as_deref(), &native_bounds)?;

    Ok(GeoTiffMetadata {
        width,
        height,
        native_bounds,
        crs,
    })
}

fn read_f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Result<Option<Vec<f64>>> {
    let value = decoder
        .find_tag(Tag::from_u16_exhaustive(code))
        .map_err(|e| raster_error("Cannot read TIFF tag", e))?;

    value
        .map(|v| v.into_f64_vec())
        .transpose()
        .map_err(|e| raster_error("Malformed TIFF tag", e))
}

fn read_u16_tag<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Result<Option<Vec<u16>>> {
    let value = decoder
        .find_tag(Tag::from_u16_exhaustive(code))
        .map_err(|e| raster_error("Cannot read TIFF tag", e))?;

    value
        .map(|v| v.into_u16_vec())
        .transpose()
        .map_err(|e| raster_error("Malformed TIFF tag", e))
}

/// Work out the file extent from the model tags
fn read_native_bounds<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> Result<Bounds> {
    let scale = read_f64_tag(decoder, MODEL_PIXEL_SCALE_TAG)?;
    let tiepoint = read_f64_tag(decoder, MODEL_TIEPOINT_TAG)?;

    let (origin_x, origin_y, pixel_width, pixel_height) = match (scale, tiepoint) {
        (Some(scale), Some(tiepoint)) if scale.len() >= 2 && tiepoint.len() >= 6 => {
            // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
            (
                tiepoint[3] - tiepoint[0] * scale[0],
                tiepoint[4] + tiepoint[1] * scale[1],
                scale[0],
                -scale[1],
            )
        }
        _ => {
            let transform = read_f64_tag(decoder, MODEL_TRANSFORMATION_TAG)?.ok_or_else(|| {
                CarbonarrError::Raster {
                    message: "Raster has no georeferencing tags".to_string(),
                }
            })?;

            if transform.len() < 16 {
                return Err(CarbonarrError::Raster {
                    message: format!(
                        "ModelTransformation tag has {} values, expected 16",
                        transform.len()
                    ),
                });
            }
            if transform[1] != 0.0 || transform[4] != 0.0 {
                return Err(CarbonarrError::Raster {
                    message: "Rotated rasters are not supported".to_string(),
                });
            }

            (transform[3], transform[7], transform[0], transform[5])
        }
    };

    let x0 = origin_x;
    let x1 = origin_x + width as f64 * pixel_width;
    let y0 = origin_y;
    let y1 = origin_y + height as f64 * pixel_height;

    let bounds = Bounds::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1));
    if !bounds.to_array().iter().all(|v| v.is_finite()) {
        return Err(CarbonarrError::Raster {
            message: "Raster extent is not finite".to_string(),
        });
    }

    Ok(bounds)
}

/// Inline GeoKey values (those stored directly in the directory)
fn parse_geokeys(directory: &[u16]) -> HashMap<u16, u16> {
    let mut keys = HashMap::new();
    if directory.len() < 4 {
        return keys;
    }

    let count = directory[3] as usize;
    for entry in directory[4..].chunks_exact(4).take(count) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location == 0 {
            keys.insert(key_id, value);
        }
    }
    keys
}

fn detect_crs(geokeys: Option<&[u16]>, bounds: &Bounds) -> Result<Crs> {
    let keys = geokeys.map(parse_geokeys).unwrap_or_default();

    if let Some(&code) = keys.get(&PROJECTED_CS_TYPE_GEO_KEY) {
        if WEB_MERCATOR_CODES.contains(&code) {
            return Ok(Crs::WebMercator);
        }
        return Err(CarbonarrError::Raster {
            message: format!(
                "Unsupported projected CRS EPSG:{}; reproject to EPSG:4326 or EPSG:3857",
                code
            ),
        });
    }

    match keys.get(&GT_MODEL_TYPE_GEO_KEY) {
        Some(&MODEL_TYPE_GEOGRAPHIC) => return Ok(Crs::Geographic),
        Some(&MODEL_TYPE_PROJECTED) => {
            return Err(CarbonarrError::Raster {
                message: "Projected raster without a recognised CRS code".to_string(),
            })
        }
        Some(&other) => {
            return Err(CarbonarrError::Raster {
                message: format!("Unsupported GeoTIFF model type {}", other),
            })
        }
        None => {}
    }

    if keys.contains_key(&GEOGRAPHIC_TYPE_GEO_KEY) {
        return Ok(Crs::Geographic);
    }

    // No GeoKeys at all: accept extents that can only be degrees
    let plausible_degrees = bounds.min_x >= -180.0
        && bounds.max_x <= 360.0
        && bounds.min_y >= -90.0
        && bounds.max_y <= 90.0;
    if plausible_degrees {
        Ok(Crs::Geographic)
    } else {
        Err(CarbonarrError::Raster {
            message: "Raster has no CRS information and its extent is not in degrees".to_string(),
        })
    }
}

/// Bytes escaped in query values: everything but unreserved characters and `/`
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode a query string value, keeping path separators readable
fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Raster provider that serves GeoTIFF files through a tile server endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffProvider {
    endpoint: String,
}

impl GeoTiffProvider {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:8000";

    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Tile URL template for a raster at `path`
    pub fn tile_url(&self, path: &Path, options: &RasterLayerOptions) -> String {
        let mut url = format!(
            "{}/api/tiles/{{z}}/{{x}}/{{y}}.png?filename={}",
            self.endpoint,
            encode_query_value(&path.to_string_lossy())
        );

        if let Some(band) = options.band {
            url.push_str(&format!("&band={}", band));
        }
        if let Some(palette) = &options.palette {
            url.push_str(&format!("&palette={}", encode_query_value(palette)));
        }
        if let Some(vmin) = options.vmin {
            url.push_str(&format!("&vmin={}", vmin));
        }
        if let Some(vmax) = options.vmax {
            url.push_str(&format!("&vmax={}", vmax));
        }
        if let Some(nodata) = options.nodata {
            url.push_str(&format!("&nodata={}", nodata));
        }

        url
    }
}

impl Default for GeoTiffProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENDPOINT)
    }
}

impl RasterProvider for GeoTiffProvider {
    fn open(&self, path: &Path, options: &RasterLayerOptions) -> Result<RasterSource> {
        let metadata = read_geotiff_metadata(path)?;
        let absolute = std::fs::canonicalize(path)?;

        let bounds = metadata.bounds_lon_lat();
        // Grids stored in 0..360 longitudes still need a viewport in -180..180
        let [lat, lon] = bounds.center_lat_lon();
        let center = [lat, geoutil::normalize_longitude(lon)];
        let default_zoom = geoutil::fit_zoom(&bounds);

        info!(
            path = %absolute.display(),
            crs = %metadata.crs,
            width = metadata.width,
            height = metadata.height,
            center_lat = center[0],
            center_lon = center[1],
            default_zoom = default_zoom,
            "Raster source opened"
        );

        Ok(RasterSource {
            tile_url: self.tile_url(&absolute, options),
            path: absolute,
            bounds,
            center,
            default_zoom,
            crs: metadata.crs,
            width: metadata.width,
            height: metadata.height,
        })
    }
}

/// Write a small single-band GeoTIFF for tests
#[cfg(test)]
pub(crate) fn create_test_geotiff(
    path: &Path,
    size: (u32, u32),
    origin: (f64, f64),
    pixel_size: f64,
    geokeys: &[u16],
) -> Result<()> {
    let model_tags = [
        (MODEL_PIXEL_SCALE_TAG, vec![pixel_size, pixel_size, 0.0]),
        (
            MODEL_TIEPOINT_TAG,
            vec![0.0, 0.0, 0.0, origin.0, origin.1, 0.0],
        ),
    ];
    write_test_geotiff(path, size, &model_tags, geokeys)
}

/// Write a GeoTIFF with arbitrary `f64` model tags
#[cfg(test)]
pub(crate) fn write_test_geotiff(
    path: &Path,
    size: (u32, u32),
    model_tags: &[(u16, Vec<f64>)],
    geokeys: &[u16],
) -> Result<()> {
    use tiff::encoder::colortype::Gray32Float;
    use tiff::encoder::TiffEncoder;

    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file).map_err(|e| raster_error("TIFF encoder error", e))?;
    let mut image = encoder
        .new_image::<Gray32Float>(size.0, size.1)
        .map_err(|e| raster_error("Cannot create TIFF image", e))?;

    for (code, values) in model_tags {
        image
            .encoder()
            .write_tag(Tag::Unknown(*code), values.as_slice())
            .map_err(|e| raster_error("Cannot write model tag", e))?;
    }

    if !geokeys.is_empty() {
        image
            .encoder()
            .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY_TAG), geokeys)
            .map_err(|e| raster_error("Cannot write geokey tag", e))?;
    }

    let data: Vec<f32> = (0..size.0 * size.1).map(|i| i as f32).collect();
    image
        .write_data(&data)
        .map_err(|e| raster_error("Cannot write image data", e))?;

    Ok(())
}
