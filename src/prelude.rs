//! Prelude module for common parcelview types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use parcelview::prelude::*;`

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use crate::core::{
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    image::ImageOverlay,
    manager::{LayerManager, OverlayGroup},
    vector::{Color, PolygonStyle, ShapeData, VectorLayer},
};

pub use crate::data::{
    boundaries::{AdminLevel, ReferenceBoundaries},
    geojson::{Feature, GeoJson, Geometry},
};

pub use crate::compositor::{HitTarget, OverlayCompositor};
pub use crate::controls::{MapControls, NavCommand, ViewLevel};
pub use crate::engine::drill::{BoundaryLevel, DrillDownEngine, DrillState};
pub use crate::store::{PolygonRecord, PolygonStore, RecordId};
pub use crate::upload::{ImageUpload, UploadAdapter, UploadError, UploadEvent};
