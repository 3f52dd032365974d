//! # Parcelview
//!
//! A map visualization engine for administrative land-parcel data in
//! Cameroon. Users upload a survey image, an external processing backend
//! extracts a single polygon from it, and the extracted parcel is rendered
//! on an interactive drill-down map (country → region → department →
//! arrondissement) alongside previously extracted parcels.
//!
//! The library is UI-framework agnostic: layers expose styled geometry and
//! the desktop shell in `parcelview-app` paints them.

pub mod api;
pub mod compositor;
pub mod controls;
pub mod core;
pub mod data;
pub mod engine;
pub mod layers;
pub mod prelude;
pub mod store;
pub mod upload;

// Re-export public API
pub use crate::core::{
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    viewport::Viewport,
};

pub use layers::{
    base::LayerTrait,
    image::ImageOverlay,
    manager::{LayerManager, OverlayGroup},
    vector::VectorLayer,
};

pub use compositor::OverlayCompositor;
pub use controls::{MapControls, NavCommand, ViewLevel};
pub use data::boundaries::{AdminLevel, ReferenceBoundaries};
pub use engine::drill::{DrillDownEngine, DrillState};
pub use store::{PolygonRecord, PolygonStore};
pub use upload::{UploadAdapter, UploadError, UploadEvent};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = ViewerError;
