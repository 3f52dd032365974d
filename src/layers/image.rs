use crate::{
    core::geo::LatLngBounds,
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

use std::sync::Arc;

/// Georeferenced image overlay.
///
/// Holds the raw encoded image bytes as an opaque displayable handle; the
/// shell decodes and textures them. The geographic footprint comes from the
/// compositor's placement rule, not from the image content.
pub struct ImageOverlay {
    properties: LayerProperties,
    data: Arc<Vec<u8>>,
    bounds: LatLngBounds,
}

impl ImageOverlay {
    pub fn new(id: String, data: Arc<Vec<u8>>, bounds: LatLngBounds) -> Self {
        let mut properties = LayerProperties::new(id, "Image".to_string(), LayerType::Image);
        properties.opacity = 0.7;
        properties.interactive = false;
        Self {
            properties,
            data,
            bounds,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    /// Raw encoded image bytes
    pub fn data(&self) -> &Arc<Vec<u8>> {
        &self.data
    }

    pub fn footprint(&self) -> &LatLngBounds {
        &self.bounds
    }
}

impl LayerTrait for ImageOverlay {
    crate::impl_layer_properties!(ImageOverlay, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(self.bounds.clone())
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "bounds": {
                "south": self.bounds.south_west.lat,
                "west": self.bounds.south_west.lng,
                "north": self.bounds.north_east.lat,
                "east": self.bounds.north_east.lng,
            }
        })
    }
}
