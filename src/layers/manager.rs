use crate::{layers::base::LayerTrait, prelude::HashMap, Result};

/// Identifies one of the independently reconciled overlay groups.
///
/// Each group's contents are always replaced wholesale: every prior handle
/// in the group is released before the new set is added, so stale shapes
/// never accumulate on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayGroup {
    /// Static country outline, drawn once and never replaced
    CountryOutline,
    /// The active administrative boundary layer (drill-down owned)
    AdminBoundaries,
    /// Accepted parcel polygons
    Parcels,
    /// Uploaded image overlays
    Images,
}

impl OverlayGroup {
    /// Default stacking order: outline under boundaries, images under the
    /// clickable parcels
    pub fn z_index(&self) -> i32 {
        match self {
            OverlayGroup::CountryOutline => 0,
            OverlayGroup::AdminBoundaries => 1,
            OverlayGroup::Images => 2,
            OverlayGroup::Parcels => 3,
        }
    }
}

/// Manages layers for the map, handling ordering and group ownership
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for painting (sorted by z-index)
    render_order: Vec<String>,
    /// Owned handle registry: group → layer ids currently alive in it
    groups: HashMap<OverlayGroup, Vec<String>>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
            groups: HashMap::default(),
        }
    }

    /// Adds a layer to the manager
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        self.render_order.retain(|id| id != layer_id);
        for ids in self.groups.values_mut() {
            ids.retain(|id| id != layer_id);
        }
        Ok(self.layers.remove(layer_id))
    }

    /// Adds a layer under a group's ownership
    pub fn add_to_group(&mut self, group: OverlayGroup, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.add_layer(layer)?;
        self.groups.entry(group).or_default().push(layer_id);
        Ok(())
    }

    /// Releases every layer a group currently owns
    pub fn clear_group(&mut self, group: OverlayGroup) {
        if let Some(ids) = self.groups.remove(&group) {
            for id in ids {
                self.render_order.retain(|other| other != &id);
                self.layers.remove(&id);
            }
        }
    }

    /// Replaces a group's contents: all prior handles in the group are
    /// released before the new set is added.
    pub fn replace_group(
        &mut self,
        group: OverlayGroup,
        layers: Vec<Box<dyn LayerTrait>>,
    ) -> Result<()> {
        self.clear_group(group);
        for layer in layers {
            self.add_to_group(group, layer)?;
        }
        Ok(())
    }

    /// Layer ids currently owned by a group, in insertion order
    pub fn group_layer_ids(&self, group: OverlayGroup) -> &[String] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Layers currently owned by a group
    pub fn group_layers(&self, group: OverlayGroup) -> Vec<&dyn LayerTrait> {
        self.group_layer_ids(group)
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Lists all layer IDs
    pub fn list_layers(&self) -> Vec<String> {
        self.layers.keys().cloned().collect()
    }

    /// Gets all layers in paint order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Applies a function to each layer mutably in paint order
    pub fn for_each_layer_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn LayerTrait),
    {
        for id in self.render_order.clone() {
            if let Some(layer) = self.layers.get_mut(&id) {
                f(layer.as_mut());
            }
        }
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::vector::VectorLayer;

    fn layer(id: &str, z: i32) -> Box<dyn LayerTrait> {
        Box::new(VectorLayer::new(id.to_string(), id.to_string()).with_z_index(z))
    }

    #[test]
    fn test_paint_order_follows_z_index() {
        let mut manager = LayerManager::new();
        manager.add_layer(layer("parcels", 3)).unwrap();
        manager.add_layer(layer("outline", 0)).unwrap();
        manager.add_layer(layer("boundaries", 1)).unwrap();

        let order: Vec<&str> = manager.layers().iter().map(|l| l.id()).collect();
        assert_eq!(order, vec!["outline", "boundaries", "parcels"]);
    }

    #[test]
    fn test_replace_group_releases_prior_handles() {
        let mut manager = LayerManager::new();
        manager
            .replace_group(OverlayGroup::Parcels, vec![layer("parcel-0", 3)])
            .unwrap();
        manager
            .replace_group(
                OverlayGroup::Parcels,
                vec![layer("parcel-0", 3), layer("parcel-1", 3)],
            )
            .unwrap();

        // No ghost of the first reconciliation remains
        assert_eq!(manager.len(), 2);
        assert_eq!(
            manager.group_layer_ids(OverlayGroup::Parcels),
            &["parcel-0".to_string(), "parcel-1".to_string()]
        );
    }

    #[test]
    fn test_clear_group_leaves_other_groups_alone() {
        let mut manager = LayerManager::new();
        manager
            .add_to_group(OverlayGroup::CountryOutline, layer("outline", 0))
            .unwrap();
        manager
            .add_to_group(OverlayGroup::Images, layer("img-0", 2))
            .unwrap();

        manager.clear_group(OverlayGroup::Images);
        assert!(manager.get_layer("img-0").is_none());
        assert!(manager.get_layer("outline").is_some());
    }

    #[test]
    fn test_remove_layer_also_forgets_group_handle() {
        let mut manager = LayerManager::new();
        manager
            .add_to_group(OverlayGroup::Parcels, layer("parcel-0", 3))
            .unwrap();
        manager.remove_layer("parcel-0").unwrap();
        assert!(manager.group_layer_ids(OverlayGroup::Parcels).is_empty());
    }
}
