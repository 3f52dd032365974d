//! Overlay compositor: reconciles the four overlay groups (country outline,
//! active administrative boundaries, accepted parcels, image footprints)
//! against their inputs.
//!
//! Each `sync` call diffs the inputs against what was last drawn and only
//! rebuilds the groups whose inputs changed. Group replacement always
//! releases the previous handles first, so stale shapes cannot survive a
//! navigation step.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::core::map::Map;
use crate::engine::drill::{BoundaryLevel, DrillDownEngine, DrillState};
use crate::layers::image::ImageOverlay;
use crate::layers::manager::OverlayGroup;
use crate::layers::vector::{Color, PolygonStyle, ShapeData, VectorLayer};
use crate::store::{PolygonRecord, PolygonStore, RecordId};
use crate::upload::PreviewHandle;

use std::sync::Arc;

const OUTLINE_LAYER_ID: &str = "country-outline";
const BOUNDARY_LAYER_ID: &str = "admin-boundaries";
const PARCEL_LAYER_ID: &str = "parcels";

const COUNTRY_OUTLINE_STYLE: PolygonStyle = PolygonStyle::new(
    Color::rgb(212, 212, 216),
    Color::rgb(82, 82, 91),
    2.0,
    0.2,
);

const PARCEL_STYLE: PolygonStyle = PolygonStyle::new(
    Color::rgb(99, 102, 241),
    Color::rgb(99, 102, 241),
    2.0,
    0.2,
);
const PARCEL_SELECTED_STYLE: PolygonStyle = PolygonStyle::new(
    Color::rgb(139, 92, 246),
    Color::rgb(139, 92, 246),
    3.0,
    0.3,
);

/// Viewport padding when fitting a freshly appended record
const NEW_RECORD_FIT_PADDING: f64 = 20.0;
/// Viewport padding when focusing an existing selection
const SELECTION_FIT_PADDING: f64 = 50.0;

/// What a pointer interaction landed on
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Boundary { level: BoundaryLevel, name: String },
    Parcel { id: RecordId },
}

/// Geographic footprint assigned to the n-th uploaded image. The backend
/// does not georeference uploads, so footprints are laid out on a fixed
/// diagonal so successive uploads stay distinguishable.
pub fn synthetic_footprint(index: usize) -> LatLngBounds {
    let offset = index as f64 * 0.5;
    LatLngBounds::from_coords(6.0 + offset, 11.0 + offset, 7.0 + offset, 12.0 + offset)
}

#[derive(Default)]
pub struct OverlayCompositor {
    outline_drawn: bool,
    last_drill_state: Option<DrillState>,
    boundary_level: Option<BoundaryLevel>,
    synced_records: usize,
    last_selection: Option<RecordId>,
    synced_images: usize,
}

impl OverlayCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full reconcile pass, called once per frame. A freshly appended
    /// record advances the drill state to the arrondissement view and the
    /// viewport fits that record last, winning over the boundary-layer fit.
    pub fn sync(
        &mut self,
        map: &mut Map,
        store: &PolygonStore,
        engine: &mut DrillDownEngine,
        previews: &[PreviewHandle],
    ) -> crate::Result<()> {
        self.ensure_outline(map, engine)?;

        let mut pending_fit: Option<LatLngBounds> = None;
        if store.len() > self.synced_records {
            if let Some(newest) = store.newest() {
                engine.advance_to_finest(newest.administrative_names.department.as_deref());
                pending_fit = newest.bounds.clone();
            }
        }

        self.sync_boundaries(map, engine)?;
        self.sync_parcels(map, store)?;
        self.sync_images(map, previews)?;

        if let Some(bounds) = pending_fit {
            map.fit_bounds(&bounds, Some(NEW_RECORD_FIT_PADDING));
        }
        Ok(())
    }

    /// Fits the viewport to the current selection, as when a list entry is
    /// clicked
    pub fn focus_selection(&self, map: &mut Map, store: &PolygonStore) {
        if let Some(bounds) = store.current_selection().and_then(|r| r.bounds.clone()) {
            map.fit_bounds(&bounds, Some(SELECTION_FIT_PADDING));
        }
    }

    fn ensure_outline(&mut self, map: &mut Map, engine: &DrillDownEngine) -> crate::Result<()> {
        if self.outline_drawn {
            return Ok(());
        }
        let mut layer = VectorLayer::new(OUTLINE_LAYER_ID.to_string(), "Cameroun".to_string())
            .non_interactive()
            .with_z_index(OverlayGroup::CountryOutline.z_index());
        for (i, feature) in engine.boundaries().country().iter().enumerate() {
            for (j, ring) in feature.exterior_rings().into_iter().enumerate() {
                layer.add_shape(ShapeData::new(
                    format!("outline-{i}-{j}"),
                    ring,
                    COUNTRY_OUTLINE_STYLE,
                ));
            }
        }
        map.layer_manager_mut()
            .replace_group(OverlayGroup::CountryOutline, vec![Box::new(layer)])?;
        self.outline_drawn = true;
        Ok(())
    }

    fn sync_boundaries(&mut self, map: &mut Map, engine: &DrillDownEngine) -> crate::Result<()> {
        if self.last_drill_state.as_ref() == Some(engine.state()) {
            return Ok(());
        }

        let active = engine.active_layer();
        let name_key = match active.level {
            BoundaryLevel::Regions => "NAME_1",
            BoundaryLevel::Departments => "NAME_2",
            BoundaryLevel::Arrondissements => "NAME_3",
        };

        let mut layer = VectorLayer::new(
            BOUNDARY_LAYER_ID.to_string(),
            "Limites administratives".to_string(),
        )
        .with_z_index(OverlayGroup::AdminBoundaries.z_index());

        for (i, feature) in active.features.iter().enumerate() {
            let name = feature.string_property(name_key).unwrap_or("").to_string();
            for (j, ring) in feature.exterior_rings().into_iter().enumerate() {
                layer.add_shape(
                    ShapeData::new(format!("{name}#{i}-{j}"), ring, active.default_style)
                        .with_hover_style(active.hover_style)
                        .with_property("name", name.clone()),
                );
            }
        }

        map.layer_manager_mut()
            .replace_group(OverlayGroup::AdminBoundaries, vec![Box::new(layer)])?;

        match active.fit_bounds {
            Some(bounds) => map.fit_bounds(&bounds, None),
            None => map.reset_view(),
        }

        self.last_drill_state = Some(engine.state().clone());
        self.boundary_level = Some(active.level);
        Ok(())
    }

    fn sync_parcels(&mut self, map: &mut Map, store: &PolygonStore) -> crate::Result<()> {
        let selection = store.current_selection().map(|r| r.id);
        if store.len() == self.synced_records && selection == self.last_selection {
            return Ok(());
        }

        let mut layer = VectorLayer::new(PARCEL_LAYER_ID.to_string(), "Parcelles".to_string())
            .with_z_index(OverlayGroup::Parcels.z_index());

        for record in store.iter() {
            let Some(ring) = record.renderable_ring() else {
                // Degrades to a list entry only
                continue;
            };
            let mut shape = ShapeData::new(
                format!("record-{}", record.id.0),
                ring.to_vec(),
                PARCEL_STYLE,
            )
            .with_selected_style(PARCEL_SELECTED_STYLE)
            .with_label(parcel_label(record))
            .with_property("record_id", record.id.0);
            shape.selected = Some(record.id) == selection;
            layer.add_shape(shape);
        }

        map.layer_manager_mut()
            .replace_group(OverlayGroup::Parcels, vec![Box::new(layer)])?;

        self.synced_records = store.len();
        self.last_selection = selection;
        Ok(())
    }

    fn sync_images(&mut self, map: &mut Map, previews: &[PreviewHandle]) -> crate::Result<()> {
        for preview in &previews[self.synced_images.min(previews.len())..] {
            let overlay = ImageOverlay::new(
                format!("image-{}", preview.index),
                Arc::clone(&preview.bytes),
                synthetic_footprint(preview.index),
            )
            .with_z_index(OverlayGroup::Images.z_index());
            map.layer_manager_mut()
                .add_to_group(OverlayGroup::Images, Box::new(overlay))?;
        }
        self.synced_images = self.synced_images.max(previews.len());
        Ok(())
    }

    /// Resolves a map click. Parcels sit above boundaries, so they win when
    /// both contain the point.
    pub fn hit_test(&self, map: &Map, point: &LatLng) -> Option<HitTarget> {
        let manager = map.layer_manager();

        for layer in manager.group_layers(OverlayGroup::Parcels).iter().rev() {
            let Some(vector) = layer.as_any().downcast_ref::<VectorLayer>() else {
                continue;
            };
            if let Some(shape) = vector.hit_test(point) {
                let id = shape
                    .get_property("record_id")
                    .and_then(|v| v.as_u64())
                    .map(RecordId)?;
                return Some(HitTarget::Parcel { id });
            }
        }

        let level = self.boundary_level?;
        for layer in manager
            .group_layers(OverlayGroup::AdminBoundaries)
            .iter()
            .rev()
        {
            let Some(vector) = layer.as_any().downcast_ref::<VectorLayer>() else {
                continue;
            };
            if let Some(shape) = vector.hit_test(point) {
                let name = shape
                    .get_property("name")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)?;
                return Some(HitTarget::Boundary { level, name });
            }
        }
        None
    }

    /// Moves the hover highlight onto whatever interactive shape sits under
    /// the pointer, clearing it when the pointer leaves everything
    pub fn update_hover(&self, map: &mut Map, point: Option<&LatLng>) {
        let hit = point.and_then(|p| self.hit_test(map, p));
        for layer_id in [PARCEL_LAYER_ID, BOUNDARY_LAYER_ID] {
            map.with_layer_mut(layer_id, |layer| {
                let Some(vector) = layer.as_any_mut().downcast_mut::<VectorLayer>() else {
                    return;
                };
                vector.clear_hover();
                if let Some(target) = &hit {
                    let wanted = match target {
                        HitTarget::Parcel { id } if layer_id == PARCEL_LAYER_ID => {
                            Some(format!("record-{}", id.0))
                        }
                        HitTarget::Boundary { name, .. } if layer_id == BOUNDARY_LAYER_ID => vector
                            .shapes()
                            .iter()
                            .find(|s| s.get_property("name").and_then(|v| v.as_str()) == Some(name))
                            .map(|s| s.id.clone()),
                        _ => None,
                    };
                    if let Some(id) = wanted {
                        vector.set_hovered(&id);
                    }
                }
            });
        }
    }
}

fn parcel_label(record: &PolygonRecord) -> String {
    let names = &record.administrative_names;
    format!(
        "Arrondissement: {}\nDépartement: {}\nPropriétaire: {}\nSuperficie: {:.2} m²",
        names.arrondissement.as_deref().unwrap_or("Inconnu"),
        names.department.as_deref().unwrap_or("Inconnu"),
        record.owner_name.as_deref().unwrap_or("Non spécifié"),
        record.area_value,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::data::boundaries::fixtures::sample_boundaries;
    use crate::store::fixtures::record;

    fn setup() -> (Map, PolygonStore, DrillDownEngine, OverlayCompositor) {
        let map = Map::with_default_view(Point::new(800.0, 600.0));
        let store = PolygonStore::new();
        let engine = DrillDownEngine::new(Arc::new(sample_boundaries()));
        (map, store, engine, OverlayCompositor::new())
    }

    fn boundary_shape_names(map: &Map) -> Vec<String> {
        let layers = map.layer_manager().group_layers(OverlayGroup::AdminBoundaries);
        layers
            .iter()
            .filter_map(|l| l.as_any().downcast_ref::<VectorLayer>())
            .flat_map(|v| v.shapes())
            .filter_map(|s| s.get_property("name").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_sync_draws_outline_and_regions() {
        let (mut map, store, mut engine, mut compositor) = setup();
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        assert_eq!(
            map.layer_manager()
                .group_layers(OverlayGroup::CountryOutline)
                .len(),
            1
        );
        assert_eq!(boundary_shape_names(&map), vec!["Centre", "Littoral"]);
    }

    #[test]
    fn test_navigation_replaces_boundary_shapes() {
        let (mut map, store, mut engine, mut compositor) = setup();
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        engine.click_region("Centre");
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        // Region shapes are fully released, not layered under
        assert_eq!(boundary_shape_names(&map), vec!["Mfoundi", "Lekié"]);
    }

    #[test]
    fn test_new_record_advances_to_arrondissements() {
        let (mut map, mut store, mut engine, mut compositor) = setup();
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        store.append(record("Yaoundé I", "Mfoundi"));
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        assert_eq!(engine.state().active_region.as_deref(), Some("Centre"));
        assert_eq!(engine.state().active_department.as_deref(), Some("Mfoundi"));
        assert_eq!(boundary_shape_names(&map), vec!["Yaoundé I", "Yaoundé II"]);

        let parcels = map.layer_manager().group_layers(OverlayGroup::Parcels);
        let vector = parcels[0].as_any().downcast_ref::<VectorLayer>().unwrap();
        assert_eq!(vector.shape_count(), 1);
        assert!(vector.shapes()[0].selected);
        assert!(vector.shapes()[0]
            .label
            .as_deref()
            .unwrap()
            .contains("Département: Mfoundi"));
    }

    #[test]
    fn test_record_without_ring_contributes_no_shape() {
        let (mut map, mut store, mut engine, mut compositor) = setup();
        let mut degenerate = record("Yaoundé I", "Mfoundi");
        degenerate.ring.clear();
        store.append(degenerate);

        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        let parcels = map.layer_manager().group_layers(OverlayGroup::Parcels);
        let vector = parcels[0].as_any().downcast_ref::<VectorLayer>().unwrap();
        assert_eq!(vector.shape_count(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_image_footprints_follow_the_diagonal() {
        let (mut map, store, mut engine, mut compositor) = setup();
        let previews = vec![
            PreviewHandle {
                index: 0,
                file_name: "a.png".to_string(),
                bytes: Arc::new(vec![1]),
            },
            PreviewHandle {
                index: 1,
                file_name: "b.png".to_string(),
                bytes: Arc::new(vec![2]),
            },
        ];
        compositor
            .sync(&mut map, &store, &mut engine, &previews)
            .unwrap();
        // Re-sync must not duplicate overlays
        compositor
            .sync(&mut map, &store, &mut engine, &previews)
            .unwrap();

        let images = map.layer_manager().group_layers(OverlayGroup::Images);
        assert_eq!(images.len(), 2);

        let second = images[1]
            .as_any()
            .downcast_ref::<ImageOverlay>()
            .unwrap()
            .footprint();
        assert_eq!(second.south_west, LatLng::new(6.5, 11.5));
        assert_eq!(second.north_east, LatLng::new(7.5, 12.5));
    }

    #[test]
    fn test_hit_test_prefers_parcels_over_boundaries() {
        let (mut map, mut store, mut engine, mut compositor) = setup();
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        // Parcel square sits at (6..7, 10..11); no boundary covers it in
        // the fixture, so also probe a boundary-only point
        let id = store.append(record("Yaoundé I", "Mfoundi"));
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        let on_parcel = LatLng::new(6.5, 10.5);
        assert_eq!(
            compositor.hit_test(&map, &on_parcel),
            Some(HitTarget::Parcel { id })
        );

        // Inside Yaoundé I but outside the Yaoundé II square
        let on_boundary = LatLng::new(3.86, 11.46);
        assert_eq!(
            compositor.hit_test(&map, &on_boundary),
            Some(HitTarget::Boundary {
                level: BoundaryLevel::Arrondissements,
                name: "Yaoundé I".to_string(),
            })
        );

        let nowhere = LatLng::new(0.0, 0.0);
        assert_eq!(compositor.hit_test(&map, &nowhere), None);
    }

    #[test]
    fn test_update_hover_tracks_pointer() {
        let (mut map, store, mut engine, mut compositor) = setup();
        compositor.sync(&mut map, &store, &mut engine, &[]).unwrap();

        let over_centre = LatLng::new(4.0, 11.5);
        compositor.update_hover(&mut map, Some(&over_centre));
        let hovered: Vec<String> = map
            .layer_manager()
            .get_layer(BOUNDARY_LAYER_ID)
            .and_then(|l| l.as_any().downcast_ref::<VectorLayer>())
            .map(|v| {
                v.shapes()
                    .iter()
                    .filter(|s| s.hovered)
                    .map(|s| s.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(hovered.len(), 1);
        assert!(hovered[0].starts_with("Centre"));

        compositor.update_hover(&mut map, None);
        let any_hovered = map
            .layer_manager()
            .get_layer(BOUNDARY_LAYER_ID)
            .and_then(|l| l.as_any().downcast_ref::<VectorLayer>())
            .map(|v| v.shapes().iter().any(|s| s.hovered))
            .unwrap_or(false);
        assert!(!any_hovered);
    }
}
