use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    prelude::HashMap,
};

use geo::Contains;
use serde::{Deserialize, Serialize};

/// Serializable RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Style for polygon shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonStyle {
    /// Fill color
    pub fill_color: Color,
    /// Border color
    pub stroke_color: Color,
    /// Border width
    pub stroke_width: f32,
    /// Fill opacity (0.0 to 1.0)
    pub fill_opacity: f32,
}

impl PolygonStyle {
    pub const fn new(
        fill_color: Color,
        stroke_color: Color,
        stroke_width: f32,
        fill_opacity: f32,
    ) -> Self {
        Self {
            fill_color,
            stroke_color,
            stroke_width,
            fill_opacity,
        }
    }
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill_color: Color::new(0, 255, 0, 100),
            stroke_color: Color::rgb(0, 200, 0),
            stroke_width: 2.0,
            fill_opacity: 0.4,
        }
    }
}

/// A named polygon shape with style and interaction state.
///
/// The ring is a closed ordered sequence of coordinates (first == last);
/// hover and selected styles, when set, take precedence over the base style.
#[derive(Debug, Clone)]
pub struct ShapeData {
    /// Unique identifier within the owning layer
    pub id: String,
    /// Closed exterior ring
    pub ring: Vec<LatLng>,
    /// Associated properties (feature names, owner, area...)
    pub properties: HashMap<String, serde_json::Value>,
    /// Popup/tooltip payload shown on pointer interaction
    pub label: Option<String>,
    /// Base style
    pub style: PolygonStyle,
    /// Style while hovered
    pub hover_style: Option<PolygonStyle>,
    /// Style while selected
    pub selected_style: Option<PolygonStyle>,
    pub hovered: bool,
    pub selected: bool,
}

impl ShapeData {
    pub fn new(id: String, ring: Vec<LatLng>, style: PolygonStyle) -> Self {
        Self {
            id,
            ring,
            properties: HashMap::default(),
            label: None,
            style,
            hover_style: None,
            selected_style: None,
            hovered: false,
            selected: false,
        }
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_hover_style(mut self, style: PolygonStyle) -> Self {
        self.hover_style = Some(style);
        self
    }

    pub fn with_selected_style(mut self, style: PolygonStyle) -> Self {
        self.selected_style = Some(style);
        self
    }

    pub fn with_property<V: Into<serde_json::Value>>(mut self, key: &str, value: V) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// The style to paint with, given the current interaction state
    pub fn effective_style(&self) -> PolygonStyle {
        if self.selected {
            self.selected_style.unwrap_or(self.style)
        } else if self.hovered {
            self.hover_style.unwrap_or(self.style)
        } else {
            self.style
        }
    }

    /// Bounding box of the ring
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.ring)
    }

    /// Point-in-polygon test against the exterior ring
    pub fn contains(&self, point: &LatLng) -> bool {
        if self.ring.len() < 4 {
            return false;
        }
        let exterior: geo_types::LineString<f64> = self
            .ring
            .iter()
            .map(|p| geo_types::Coord { x: p.lng, y: p.lat })
            .collect();
        let polygon = geo_types::Polygon::new(exterior, vec![]);
        polygon.contains(&geo_types::Point::new(point.lng, point.lat))
    }
}

/// Vector layer holding an ordered collection of polygon shapes
pub struct VectorLayer {
    properties: LayerProperties,
    /// Shapes in insertion order; later shapes sit on top for hit-testing
    shapes: Vec<ShapeData>,
}

impl VectorLayer {
    pub fn new(id: String, name: String) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Vector),
            shapes: Vec::new(),
        }
    }

    pub fn non_interactive(mut self) -> Self {
        self.properties.interactive = false;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    pub fn add_shape(&mut self, shape: ShapeData) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[ShapeData] {
        &self.shapes
    }

    pub fn get_shape(&self, id: &str) -> Option<&ShapeData> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_shape_mut(&mut self, id: &str) -> Option<&mut ShapeData> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Marks exactly one shape as hovered, clearing any previous hover
    pub fn set_hovered(&mut self, id: &str) {
        for shape in &mut self.shapes {
            shape.hovered = shape.id == id;
        }
    }

    /// Restores every shape to its default presentation
    pub fn clear_hover(&mut self) {
        for shape in &mut self.shapes {
            shape.hovered = false;
        }
    }

    /// Finds the topmost shape containing the given point
    pub fn hit_test(&self, point: &LatLng) -> Option<&ShapeData> {
        if !self.properties.interactive {
            return None;
        }
        self.shapes.iter().rev().find(|s| s.contains(point))
    }
}

impl LayerTrait for VectorLayer {
    crate::impl_layer_properties!(VectorLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        let mut bounds: Option<LatLngBounds> = None;
        for shape in &self.shapes {
            if let Some(shape_bounds) = shape.bounds() {
                bounds = Some(match bounds {
                    Some(b) => b.union(&shape_bounds),
                    None => shape_bounds,
                });
            }
        }
        bounds
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "interactive": self.properties.interactive,
            "shape_count": self.shapes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<LatLng> {
        vec![
            LatLng::new(6.0, 10.0),
            LatLng::new(7.0, 10.0),
            LatLng::new(7.0, 11.0),
            LatLng::new(6.0, 11.0),
            LatLng::new(6.0, 10.0),
        ]
    }

    #[test]
    fn test_vector_layer_creation() {
        let layer = VectorLayer::new("parcels".to_string(), "Parcelles".to_string());
        assert_eq!(layer.id(), "parcels");
        assert_eq!(layer.layer_type(), LayerType::Vector);
        assert_eq!(layer.shape_count(), 0);
    }

    #[test]
    fn test_shape_contains() {
        let shape = ShapeData::new("s1".to_string(), unit_square(), PolygonStyle::default());
        assert!(shape.contains(&LatLng::new(6.5, 10.5)));
        assert!(!shape.contains(&LatLng::new(8.0, 10.5)));
    }

    #[test]
    fn test_hit_test_topmost() {
        let mut layer = VectorLayer::new("t".to_string(), "Test".to_string());
        layer.add_shape(ShapeData::new(
            "bottom".to_string(),
            unit_square(),
            PolygonStyle::default(),
        ));
        layer.add_shape(ShapeData::new(
            "top".to_string(),
            unit_square(),
            PolygonStyle::default(),
        ));

        let hit = layer.hit_test(&LatLng::new(6.5, 10.5)).unwrap();
        assert_eq!(hit.id, "top");
    }

    #[test]
    fn test_non_interactive_layer_ignores_hits() {
        let mut layer = VectorLayer::new("outline".to_string(), "Contour".to_string())
            .non_interactive();
        layer.add_shape(ShapeData::new(
            "cm".to_string(),
            unit_square(),
            PolygonStyle::default(),
        ));
        assert!(layer.hit_test(&LatLng::new(6.5, 10.5)).is_none());
    }

    #[test]
    fn test_hover_state_is_exclusive() {
        let mut layer = VectorLayer::new("r".to_string(), "Régions".to_string());
        layer.add_shape(ShapeData::new(
            "Centre".to_string(),
            unit_square(),
            PolygonStyle::default(),
        ));
        layer.add_shape(ShapeData::new(
            "Littoral".to_string(),
            unit_square(),
            PolygonStyle::default(),
        ));

        layer.set_hovered("Centre");
        assert!(layer.get_shape("Centre").unwrap().hovered);
        assert!(!layer.get_shape("Littoral").unwrap().hovered);

        layer.set_hovered("Littoral");
        assert!(!layer.get_shape("Centre").unwrap().hovered);

        layer.clear_hover();
        assert!(!layer.get_shape("Littoral").unwrap().hovered);
    }

    #[test]
    fn test_effective_style_precedence() {
        let base = PolygonStyle::default();
        let hover = PolygonStyle {
            stroke_width: 3.0,
            ..base
        };
        let selected = PolygonStyle {
            stroke_width: 5.0,
            ..base
        };

        let mut shape = ShapeData::new("s".to_string(), unit_square(), base)
            .with_hover_style(hover)
            .with_selected_style(selected);

        assert_eq!(shape.effective_style().stroke_width, 2.0);

        shape.hovered = true;
        assert_eq!(shape.effective_style().stroke_width, 3.0);

        // Selection wins over hover
        shape.selected = true;
        assert_eq!(shape.effective_style().stroke_width, 5.0);
    }
}
