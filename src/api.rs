//! Wire contract with the polygon-extraction backend.
//!
//! The backend returns one extraction per request. `results` must be a
//! single object; an array there, a missing `results`, or `success: false`
//! all count as a malformed response.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::store::{AdministrativeNames, PolygonRecord, RecordId};
use crate::upload::UploadError;

use serde::Deserialize;

/// Top-level backend response envelope
#[derive(Debug, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Option<ExtractionResult>,
}

/// One extracted polygon with its metadata, as sent by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionResult {
    /// Outline as (lon, lat) pairs; superseded by `polygon.geometry` when
    /// that is present
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
    pub area_value: f64,
    #[serde(default)]
    pub arrondissement_name: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub polygon: Option<PolygonInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolygonInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PolygonGeometry,
    /// [minLon, minLat, maxLon, maxLat]
    #[serde(default)]
    pub bounds: Vec<f64>,
    #[serde(default)]
    pub centroid: Option<[f64; 2]>,
    #[serde(default)]
    pub perimeter: f64,
    #[serde(default)]
    pub area: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// Parses a backend response body, enforcing the single-object contract
pub fn parse_response(body: &str) -> Result<ExtractionResult, UploadError> {
    let response: ProcessResponse =
        serde_json::from_str(body).map_err(|_| UploadError::MalformedResponse)?;
    if !response.success {
        return Err(UploadError::MalformedResponse);
    }
    response.results.ok_or(UploadError::MalformedResponse)
}

impl ExtractionResult {
    /// Converts an accepted extraction into a store record, copying every
    /// measurement verbatim. The store assigns the final id on append.
    pub fn into_record(self) -> PolygonRecord {
        let ring: Vec<LatLng> = self
            .polygon
            .as_ref()
            .and_then(|p| p.geometry.coordinates.first())
            .map(|outer| outer.iter().map(|&pair| LatLng::from_lon_lat(pair)).collect())
            .unwrap_or_else(|| {
                self.coordinates
                    .iter()
                    .map(|&pair| LatLng::from_lon_lat(pair))
                    .collect()
            });

        let (bounds, centroid, perimeter, area) = match &self.polygon {
            Some(info) => (
                LatLngBounds::from_bbox(&info.bounds),
                info.centroid.map(LatLng::from_lon_lat),
                info.perimeter,
                info.area,
            ),
            None => (LatLngBounds::from_points(&ring), None, 0.0, 0.0),
        };

        PolygonRecord {
            id: RecordId(0),
            ring,
            bounds,
            centroid,
            perimeter,
            area,
            area_value: self.area_value,
            administrative_names: AdministrativeNames {
                arrondissement: self.arrondissement_name,
                department: self.department_name,
            },
            owner_name: self.owner_name,
        }
    }
}
