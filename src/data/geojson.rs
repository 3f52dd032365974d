use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GeoJSON geometry subset present in the administrative boundary datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<Geometry>,
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection { features: Vec<Feature> },
}

impl GeoJson {
    /// Parses a GeoJSON document from a raw JSON string
    pub fn from_str(geojson_str: &str) -> crate::Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| crate::Error::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    /// All features of the document, in file order
    pub fn features(&self) -> Vec<&Feature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features.iter().collect(),
        }
    }

    pub fn into_features(self) -> Vec<Feature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features,
        }
    }
}

impl Feature {
    /// Reads a string-valued property
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.properties.as_ref()?.get(key)?.as_str()
    }

    /// The exterior rings of the geometry (holes are not modeled), as
    /// `LatLng` sequences
    pub fn exterior_rings(&self) -> Vec<Vec<LatLng>> {
        match &self.geometry {
            Some(Geometry::Polygon { coordinates }) => coordinates
                .first()
                .map(|ring| vec![ring_to_lat_lngs(ring)])
                .unwrap_or_default(),
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .iter()
                .filter_map(|polygon| polygon.first().map(|ring| ring_to_lat_lngs(ring)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Bounding box of the feature's exterior rings
    pub fn bounds(&self) -> Option<LatLngBounds> {
        let mut bounds: Option<LatLngBounds> = None;
        for ring in self.exterior_rings() {
            if let Some(ring_bounds) = LatLngBounds::from_points(&ring) {
                bounds = Some(match bounds {
                    Some(b) => b.union(&ring_bounds),
                    None => ring_bounds,
                });
            }
        }
        bounds
    }
}

fn ring_to_lat_lngs(ring: &[[f64; 2]]) -> Vec<LatLng> {
    ring.iter().map(|c| LatLng::from_lon_lat(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGIONS: &str = r#"
    {
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"NAME_1": "Centre"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[11.0, 3.5], [12.5, 3.5], [12.5, 5.0], [11.0, 5.0], [11.0, 3.5]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"NAME_1": "Littoral"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[9.5, 3.8], [10.5, 3.8], [10.5, 5.0], [9.5, 5.0], [9.5, 3.8]]]]
                }
            }
        ]
    }
    "#;

    #[test]
    fn test_feature_collection_parsing() {
        let geojson = GeoJson::from_str(REGIONS).unwrap();
        let features = geojson.features();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].string_property("NAME_1"), Some("Centre"));
        assert_eq!(features[1].string_property("NAME_1"), Some("Littoral"));
    }

    #[test]
    fn test_invalid_geojson_is_a_parse_error() {
        assert!(GeoJson::from_str("{\"type\": \"Garbage\"}").is_err());
        assert!(GeoJson::from_str("not json").is_err());
    }

    #[test]
    fn test_exterior_rings_lat_lng_order() {
        let geojson = GeoJson::from_str(REGIONS).unwrap();
        let rings = geojson.features()[0].exterior_rings();
        assert_eq!(rings.len(), 1);
        // GeoJSON coordinates are [lon, lat]
        assert_eq!(rings[0][0], LatLng::new(3.5, 11.0));
    }

    #[test]
    fn test_multipolygon_rings() {
        let geojson = GeoJson::from_str(REGIONS).unwrap();
        let rings = geojson.features()[1].exterior_rings();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn test_feature_bounds() {
        let geojson = GeoJson::from_str(REGIONS).unwrap();
        let bounds = geojson.features()[0].bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(3.5, 11.0));
        assert_eq!(bounds.north_east, LatLng::new(5.0, 12.5));
    }
}
