//! The static basemap catalog.
//!
//! Names follow the dotted `Provider.Variant` convention used by Leaflet
//! provider lists. Lookup is a plain map access.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::provider::Basemap;
use crate::error::{CarbonarrError, Result};

const OSM_ATTRIBUTION: &str = "(C) OpenStreetMap contributors";
const OSM_FR_ATTRIBUTION: &str = "(C) OpenStreetMap France | (C) OpenStreetMap contributors";
const ESRI_ATTRIBUTION: &str = "Tiles (C) Esri";
const CARTO_ATTRIBUTION: &str = "(C) OpenStreetMap contributors (C) CARTO";
const GAODE_ATTRIBUTION: &str = "(C) Gaode.com";

const ABC: &[&str] = &["a", "b", "c"];
const ABCD: &[&str] = &["a", "b", "c", "d"];
const GAODE_SUBDOMAINS: &[&str] = &["1", "2", "3", "4"];

static BASEMAPS: &[Basemap] = &[
    Basemap {
        name: "OpenStreetMap.Mapnik",
        url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: OSM_ATTRIBUTION,
        max_zoom: 19,
        subdomains: &[],
        variables: &[],
    },
    Basemap {
        name: "OpenStreetMap.DE",
        url: "https://tile.openstreetmap.de/{z}/{x}/{y}.png",
        attribution: OSM_ATTRIBUTION,
        max_zoom: 18,
        subdomains: &[],
        variables: &[],
    },
    Basemap {
        name: "OpenStreetMap.France",
        url: "https://{s}.tile.openstreetmap.fr/osmfr/{z}/{x}/{y}.png",
        attribution: OSM_FR_ATTRIBUTION,
        max_zoom: 20,
        subdomains: ABC,
        variables: &[],
    },
    Basemap {
        name: "OpenStreetMap.HOT",
        url: "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
        attribution: OSM_FR_ATTRIBUTION,
        max_zoom: 19,
        subdomains: ABC,
        variables: &[],
    },
    Basemap {
        name: "OpenTopoMap",
        url: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        attribution: "Map data: (C) OpenStreetMap contributors, SRTM | Map style: (C) OpenTopoMap (CC-BY-SA)",
        max_zoom: 17,
        subdomains: ABC,
        variables: &[],
    },
    Basemap {
        name: "OpenRailwayMap",
        url: "https://{s}.tiles.openrailwaymap.org/standard/{z}/{x}/{y}.png",
        attribution: "Map data: (C) OpenStreetMap contributors | Map style: (C) OpenRailwayMap (CC-BY-SA)",
        max_zoom: 19,
        subdomains: ABC,
        variables: &[],
    },
    Basemap {
        name: "Esri.WorldStreetMap",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/{variant}/MapServer/tile/{z}/{y}/{x}",
        attribution: ESRI_ATTRIBUTION,
        max_zoom: 18,
        subdomains: &[],
        variables: &[("variant", "World_Street_Map")],
    },
    Basemap {
        name: "Esri.WorldImagery",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/{variant}/MapServer/tile/{z}/{y}/{x}",
        attribution: ESRI_ATTRIBUTION,
        max_zoom: 18,
        subdomains: &[],
        variables: &[("variant", "World_Imagery")],
    },
    Basemap {
        name: "Esri.WorldTopoMap",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/{variant}/MapServer/tile/{z}/{y}/{x}",
        attribution: ESRI_ATTRIBUTION,
        max_zoom: 18,
        subdomains: &[],
        variables: &[("variant", "World_Topo_Map")],
    },
    Basemap {
        name: "Esri.NatGeoWorldMap",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/{variant}/MapServer/tile/{z}/{y}/{x}",
        attribution: ESRI_ATTRIBUTION,
        max_zoom: 16,
        subdomains: &[],
        variables: &[("variant", "NatGeo_World_Map")],
    },
    Basemap {
        name: "Esri.WorldGrayCanvas",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/{variant}/MapServer/tile/{z}/{y}/{x}",
        attribution: ESRI_ATTRIBUTION,
        max_zoom: 16,
        subdomains: &[],
        variables: &[("variant", "Canvas/World_Light_Gray_Base")],
    },
    Basemap {
        name: "CartoDB.Positron",
        url: "https://{s}.basemaps.cartocdn.com/{variant}/{z}/{x}/{y}{r}.png",
        attribution: CARTO_ATTRIBUTION,
        max_zoom: 20,
        subdomains: ABCD,
        variables: &[("variant", "light_all")],
    },
    Basemap {
        name: "CartoDB.DarkMatter",
        url: "https://{s}.basemaps.cartocdn.com/{variant}/{z}/{x}/{y}{r}.png",
        attribution: CARTO_ATTRIBUTION,
        max_zoom: 20,
        subdomains: ABCD,
        variables: &[("variant", "dark_all")],
    },
    Basemap {
        name: "CartoDB.Voyager",
        url: "https://{s}.basemaps.cartocdn.com/{variant}/{z}/{x}/{y}{r}.png",
        attribution: CARTO_ATTRIBUTION,
        max_zoom: 20,
        subdomains: ABCD,
        variables: &[("variant", "rastertiles/voyager")],
    },
    Basemap {
        name: "Gaode.Normal",
        url: "http://webrd0{s}.is.autonavi.com/appmaptile?lang=zh_cn&size=1&scale=1&style=8&x={x}&y={y}&z={z}",
        attribution: GAODE_ATTRIBUTION,
        max_zoom: 19,
        subdomains: GAODE_SUBDOMAINS,
        variables: &[],
    },
    Basemap {
        name: "Gaode.Satellite",
        url: "http://webst0{s}.is.autonavi.com/appmaptile?style=6&x={x}&y={y}&z={z}",
        attribution: GAODE_ATTRIBUTION,
        max_zoom: 19,
        subdomains: GAODE_SUBDOMAINS,
        variables: &[],
    },
];

static CATALOG: Lazy<HashMap<&'static str, &'static Basemap>> =
    Lazy::new(|| BASEMAPS.iter().map(|b| (b.name, b)).collect());

/// Look up a basemap by its dotted name
pub fn get(name: &str) -> Option<&'static Basemap> {
    CATALOG.get(name).copied()
}

/// Look up a basemap, failing with a resolution error for unknown names
pub fn resolve(name: &str) -> Result<&'static Basemap> {
    get(name).ok_or_else(|| CarbonarrError::Resolution {
        name: name.to_string(),
    })
}

/// All catalog names, sorted
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CATALOG.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        assert_eq!(CATALOG.len(), BASEMAPS.len());
    }

    #[test]
    fn test_resolve_known_name() {
        let basemap = resolve("OpenStreetMap.Mapnik").unwrap();
        assert_eq!(
            basemap.build_url(),
            "https://tile.openstreetmap.org/{z}/{x}/{y}.png"
        );

        let positron = resolve("CartoDB.Positron").unwrap();
        assert_eq!(
            positron.build_url(),
            "https://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png"
        );
    }

    #[test]
    fn test_resolve_unknown_name() {
        match resolve("OpenStreetMap.Nowhere") {
            Err(CarbonarrError::Resolution { name }) => assert_eq!(name, "OpenStreetMap.Nowhere"),
            other => panic!("Expected resolution error, got {:?}", other),
        }

        // Names are never evaluated, so expression-like input is just unknown
        assert!(resolve("__import__('os')").is_err());
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_every_url_keeps_tile_placeholders() {
        for name in names() {
            let url = resolve(name).unwrap().build_url();
            assert!(url.contains("{x}"), "{} lost {{x}}", name);
            assert!(url.contains("{y}"), "{} lost {{y}}", name);
            assert!(url.contains("{z}"), "{} lost {{z}}", name);
            assert!(!url.contains("{s}"), "{} kept {{s}}", name);
            assert!(!url.contains("{variant}"), "{} kept {{variant}}", name);
        }
    }

    #[test]
    fn test_names_sorted() {
        let names = names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Esri.WorldImagery"));
    }
}
