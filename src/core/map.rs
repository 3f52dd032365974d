use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::{base::LayerTrait, manager::LayerManager},
    Result,
};

/// Default view over Cameroon, shown at startup and on reset
pub const DEFAULT_CENTER: LatLng = LatLng::new(7.3697, 12.3547);
pub const DEFAULT_ZOOM: f64 = 6.0;

/// Fixed zoom levels for the region and department focus commands
pub const REGION_ZOOM: f64 = 8.0;
pub const DEPARTMENT_ZOOM: f64 = 10.0;

/// The long-lived map resource.
///
/// Constructed once at startup and passed explicitly (by `&mut`) to any
/// component that needs to add or remove layers or move the viewport; layer
/// objects are exclusively owned here, no other component retains handles
/// to them.
pub struct Map {
    pub viewport: Viewport,
    layer_manager: LayerManager,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            viewport: Viewport::new(center, zoom, size),
            layer_manager: LayerManager::new(),
        }
    }

    /// Creates a map at the default Cameroon view
    pub fn with_default_view(size: Point) -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM, size)
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_view(center, zoom);
    }

    /// Returns the viewport to the default Cameroon view
    pub fn reset_view(&mut self) {
        log::debug!("map view reset to default");
        self.viewport.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) {
        self.viewport.fit_bounds(bounds, padding);
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        self.layer_manager.add_layer(layer)
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        self.layer_manager.remove_layer(layer_id)
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layer_manager.with_layer_mut(layer_id, f)
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    pub fn layer_manager(&self) -> &LayerManager {
        &self.layer_manager
    }

    pub fn layer_manager_mut(&mut self) -> &mut LayerManager {
        &mut self.layer_manager
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }
}
