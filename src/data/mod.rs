pub mod boundaries;
pub mod geojson;
