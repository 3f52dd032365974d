use crate::core::geo::LatLngBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Vector,
    Image,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Vector => write!(f, "vector"),
            LayerType::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
    pub interactive: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            z_index: 0,
            opacity: 1.0,
            visible: true,
            interactive: true,
        }
    }
}

/// Object-safe seam between the map and its layers.
///
/// Layers expose styled geometry; the application shell does the actual
/// painting, so no render context appears here.
pub trait LayerTrait {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;

    fn z_index(&self) -> i32;

    fn set_z_index(&mut self, z_index: i32);

    fn opacity(&self) -> f32;

    fn set_opacity(&mut self, opacity: f32);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    fn is_interactive(&self) -> bool;

    fn bounds(&self) -> Option<LatLngBounds>;

    fn options(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Implements the `LayerTrait` property boilerplate for a layer struct with
/// a `LayerProperties` field.
#[macro_export]
macro_rules! impl_layer_properties {
    ($type:ty, $field:ident) => {
        fn id(&self) -> &str {
            &self.$field.id
        }

        fn name(&self) -> &str {
            &self.$field.name
        }

        fn layer_type(&self) -> $crate::layers::base::LayerType {
            self.$field.layer_type
        }

        fn z_index(&self) -> i32 {
            self.$field.z_index
        }

        fn set_z_index(&mut self, z_index: i32) {
            self.$field.z_index = z_index;
        }

        fn opacity(&self) -> f32 {
            self.$field.opacity
        }

        fn set_opacity(&mut self, opacity: f32) {
            self.$field.opacity = opacity.clamp(0.0, 1.0);
        }

        fn is_visible(&self) -> bool {
            self.$field.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$field.visible = visible;
        }

        fn is_interactive(&self) -> bool {
            self.$field.interactive
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
