//! Navigation controls: the button row above the map, mapped to viewport
//! and drill-state transitions.

use crate::core::map::{Map, DEFAULT_CENTER, DEPARTMENT_ZOOM, REGION_ZOOM};
use crate::engine::drill::DrillDownEngine;
use crate::store::PolygonStore;

/// Which administrative granularity the view currently targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLevel {
    #[default]
    Country,
    Region,
    Department,
    Arrondissement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    ZoomIn,
    ZoomOut,
    /// One drill level up
    Back,
    /// Country view, both active names cleared
    Reset,
    /// Region-scale zoom at the national center
    FocusRegion,
    /// Department-scale zoom at the national center
    FocusDepartment,
    /// Fit the currently selected parcel
    FocusArrondissement,
}

#[derive(Debug, Default)]
pub struct MapControls {
    current_view: ViewLevel,
}

impl MapControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_view(&self) -> ViewLevel {
        self.current_view
    }

    /// Whether a command is actionable in the current state; disabled
    /// buttons are grayed out rather than hidden
    pub fn is_enabled(
        &self,
        command: NavCommand,
        engine: &DrillDownEngine,
        store: &PolygonStore,
    ) -> bool {
        match command {
            NavCommand::Back => engine.state().active_region.is_some(),
            // The level-switch buttons only make sense once a parcel exists
            NavCommand::FocusRegion | NavCommand::FocusDepartment => {
                store.current_selection().is_some()
            }
            NavCommand::FocusArrondissement => store
                .current_selection()
                .map(|r| r.bounds.is_some())
                .unwrap_or(false),
            _ => true,
        }
    }

    pub fn dispatch(
        &mut self,
        command: NavCommand,
        map: &mut Map,
        engine: &mut DrillDownEngine,
        store: &PolygonStore,
    ) {
        if !self.is_enabled(command, engine, store) {
            return;
        }
        log::debug!("nav command {command:?}");
        match command {
            NavCommand::ZoomIn => map.zoom_in(),
            NavCommand::ZoomOut => map.zoom_out(),
            NavCommand::Back => {
                engine.back();
                self.current_view = if engine.state().active_department.is_some() {
                    ViewLevel::Department
                } else if engine.state().active_region.is_some() {
                    ViewLevel::Region
                } else {
                    ViewLevel::Country
                };
            }
            NavCommand::Reset => {
                engine.reset();
                map.reset_view();
                self.current_view = ViewLevel::Country;
            }
            NavCommand::FocusRegion => {
                map.set_view(DEFAULT_CENTER, REGION_ZOOM);
                self.current_view = ViewLevel::Region;
            }
            NavCommand::FocusDepartment => {
                map.set_view(DEFAULT_CENTER, DEPARTMENT_ZOOM);
                self.current_view = ViewLevel::Department;
            }
            NavCommand::FocusArrondissement => {
                if let Some(bounds) = store.current_selection().and_then(|r| r.bounds.clone()) {
                    map.fit_bounds(&bounds, Some(50.0));
                }
                self.current_view = ViewLevel::Arrondissement;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::core::map::DEFAULT_ZOOM;
    use crate::data::boundaries::fixtures::sample_boundaries;
    use crate::store::fixtures::record;
    use std::sync::Arc;

    fn setup() -> (Map, DrillDownEngine, PolygonStore, MapControls) {
        (
            Map::with_default_view(Point::new(800.0, 600.0)),
            DrillDownEngine::new(Arc::new(sample_boundaries())),
            PolygonStore::new(),
            MapControls::new(),
        )
    }

    #[test]
    fn test_back_disabled_at_country_level() {
        let (mut map, mut engine, store, mut controls) = setup();
        assert!(!controls.is_enabled(NavCommand::Back, &engine, &store));

        // Dispatching a disabled command changes nothing
        controls.dispatch(NavCommand::Back, &mut map, &mut engine, &store);
        assert_eq!(controls.current_view(), ViewLevel::Country);
    }

    #[test]
    fn test_back_walks_up_the_hierarchy() {
        let (mut map, mut engine, store, mut controls) = setup();
        engine.advance_to_finest(Some("Mfoundi"));

        controls.dispatch(NavCommand::Back, &mut map, &mut engine, &store);
        assert_eq!(controls.current_view(), ViewLevel::Region);
        assert_eq!(engine.state().active_department, None);

        controls.dispatch(NavCommand::Back, &mut map, &mut engine, &store);
        assert_eq!(controls.current_view(), ViewLevel::Country);
    }

    #[test]
    fn test_reset_restores_default_view() {
        let (mut map, mut engine, store, mut controls) = setup();
        engine.advance_to_finest(Some("Mfoundi"));
        map.set_view(DEFAULT_CENTER, DEPARTMENT_ZOOM);

        controls.dispatch(NavCommand::Reset, &mut map, &mut engine, &store);
        assert_eq!(engine.state().active_region, None);
        assert_eq!(map.viewport().zoom, DEFAULT_ZOOM);
        assert_eq!(map.viewport().center, DEFAULT_CENTER);
    }

    #[test]
    fn test_zoom_commands_only_touch_the_viewport() {
        let (mut map, mut engine, store, mut controls) = setup();
        engine.click_region("Centre");

        controls.dispatch(NavCommand::ZoomIn, &mut map, &mut engine, &store);
        assert_eq!(map.viewport().zoom, DEFAULT_ZOOM + 1.0);
        assert_eq!(engine.state().active_region.as_deref(), Some("Centre"));

        controls.dispatch(NavCommand::ZoomOut, &mut map, &mut engine, &store);
        assert_eq!(map.viewport().zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_focus_levels_set_canonical_zooms() {
        let (mut map, mut engine, mut store, mut controls) = setup();

        // Level switching is disabled until a parcel exists
        assert!(!controls.is_enabled(NavCommand::FocusRegion, &engine, &store));
        store.append(record("Yaoundé I", "Mfoundi"));

        controls.dispatch(NavCommand::FocusRegion, &mut map, &mut engine, &store);
        assert_eq!(map.viewport().zoom, REGION_ZOOM);

        controls.dispatch(NavCommand::FocusDepartment, &mut map, &mut engine, &store);
        assert_eq!(map.viewport().zoom, DEPARTMENT_ZOOM);
        assert_eq!(controls.current_view(), ViewLevel::Department);
    }

    #[test]
    fn test_focus_arrondissement_needs_a_selection() {
        let (mut map, mut engine, mut store, mut controls) = setup();
        assert!(!controls.is_enabled(NavCommand::FocusArrondissement, &engine, &store));

        store.append(record("Yaoundé I", "Mfoundi"));
        assert!(controls.is_enabled(NavCommand::FocusArrondissement, &engine, &store));

        let before = map.viewport().zoom;
        controls.dispatch(NavCommand::FocusArrondissement, &mut map, &mut engine, &store);
        assert_ne!(map.viewport().zoom, before);
    }
}
