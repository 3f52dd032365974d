//! Administrative drill-down: tracks which unit the user is inside and
//! derives the boundary layer to display from the reference datasets.
//!
//! The state is just the pair of active names; everything else (displayed
//! features, fit bounds, styles) is derived on demand, so the engine can
//! never disagree with the reference data.

use crate::core::geo::LatLngBounds;
use crate::data::boundaries::{features_bounds, ReferenceBoundaries};
use crate::data::geojson::Feature;
use crate::layers::vector::{Color, PolygonStyle};

use std::sync::Arc;

/// Which boundary features are currently drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryLevel {
    Regions,
    Departments,
    Arrondissements,
}

const REGION_STYLE: PolygonStyle = PolygonStyle::new(
    Color::rgb(196, 181, 253),
    Color::rgb(76, 29, 149),
    1.0,
    0.4,
);
const REGION_HOVER: PolygonStyle = PolygonStyle::new(
    Color::rgb(167, 139, 250),
    Color::rgb(76, 29, 149),
    3.0,
    0.6,
);

const DEPARTMENT_STYLE: PolygonStyle = PolygonStyle::new(
    Color::rgb(165, 180, 252),
    Color::rgb(55, 48, 163),
    1.0,
    0.5,
);
const DEPARTMENT_HOVER: PolygonStyle = PolygonStyle::new(
    Color::rgb(165, 180, 252),
    Color::rgb(55, 48, 163),
    3.0,
    0.7,
);

const ARRONDISSEMENT_STYLE: PolygonStyle = PolygonStyle::new(
    Color::rgb(147, 197, 253),
    Color::rgb(30, 58, 138),
    1.0,
    0.6,
);
const ARRONDISSEMENT_HOVER: PolygonStyle = PolygonStyle::new(
    Color::rgb(147, 197, 253),
    Color::rgb(30, 58, 138),
    3.0,
    0.6,
);

impl BoundaryLevel {
    pub fn default_style(&self) -> PolygonStyle {
        match self {
            BoundaryLevel::Regions => REGION_STYLE,
            BoundaryLevel::Departments => DEPARTMENT_STYLE,
            BoundaryLevel::Arrondissements => ARRONDISSEMENT_STYLE,
        }
    }

    pub fn hover_style(&self) -> PolygonStyle {
        match self {
            BoundaryLevel::Regions => REGION_HOVER,
            BoundaryLevel::Departments => DEPARTMENT_HOVER,
            BoundaryLevel::Arrondissements => ARRONDISSEMENT_HOVER,
        }
    }
}

/// The pair of active names. A department is only ever active together
/// with its parent region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillState {
    pub active_region: Option<String>,
    pub active_department: Option<String>,
}

impl DrillState {
    pub fn level(&self) -> BoundaryLevel {
        if self.active_department.is_some() {
            BoundaryLevel::Arrondissements
        } else if self.active_region.is_some() {
            BoundaryLevel::Departments
        } else {
            BoundaryLevel::Regions
        }
    }
}

/// The boundary layer to display, derived from the current state
pub struct ActiveBoundaryLayer<'a> {
    pub level: BoundaryLevel,
    pub features: Vec<&'a Feature>,
    /// Box the viewport should fit when this layer is entered; absent at
    /// the top level, where the default country view applies
    pub fit_bounds: Option<LatLngBounds>,
    pub default_style: PolygonStyle,
    pub hover_style: PolygonStyle,
}

pub struct DrillDownEngine {
    boundaries: Arc<ReferenceBoundaries>,
    state: DrillState,
}

impl DrillDownEngine {
    pub fn new(boundaries: Arc<ReferenceBoundaries>) -> Self {
        Self {
            boundaries,
            state: DrillState::default(),
        }
    }

    pub fn state(&self) -> &DrillState {
        &self.state
    }

    pub fn boundaries(&self) -> &ReferenceBoundaries {
        &self.boundaries
    }

    /// Enters a region. Unknown names are ignored; any active department is
    /// cleared since it belonged to the previous region.
    pub fn click_region(&mut self, name: &str) {
        if self.boundaries.region(name).is_none() {
            log::warn!("ignoring click on unknown region {name:?}");
            return;
        }
        log::debug!("entering region {name:?}");
        self.state.active_region = Some(name.to_string());
        self.state.active_department = None;
    }

    /// Enters a department. The department must exist and belong to the
    /// active region, otherwise the click is ignored.
    pub fn click_department(&mut self, name: &str) {
        let parent = self
            .boundaries
            .department(name)
            .and_then(|f| f.string_property("NAME_1"));
        match (parent, self.state.active_region.as_deref()) {
            (Some(parent), Some(active)) if parent == active => {
                log::debug!("entering department {name:?}");
                self.state.active_department = Some(name.to_string());
            }
            _ => log::warn!("ignoring click on department {name:?} outside the active region"),
        }
    }

    /// Steps one level up; a no-op at the top level
    pub fn back(&mut self) {
        if self.state.active_department.take().is_some() {
            return;
        }
        self.state.active_region = None;
    }

    /// Returns to the country view; idempotent
    pub fn reset(&mut self) {
        self.state = DrillState::default();
    }

    /// Jumps straight to the arrondissement view of the given department,
    /// as happens when a freshly extracted polygon arrives. Unknown
    /// department names leave the state unchanged.
    pub fn advance_to_finest(&mut self, department: Option<&str>) {
        let Some(name) = department else { return };
        let Some(parent) = self
            .boundaries
            .department(name)
            .and_then(|f| f.string_property("NAME_1"))
        else {
            log::warn!("cannot advance to unknown department {name:?}");
            return;
        };
        self.state.active_region = Some(parent.to_string());
        self.state.active_department = Some(name.to_string());
    }

    /// Derives the boundary layer for the current state
    pub fn active_layer(&self) -> ActiveBoundaryLayer<'_> {
        let level = self.state.level();
        let (features, fit_bounds) = match (&self.state.active_region, &self.state.active_department)
        {
            (_, Some(department)) => {
                let features = self.boundaries.arrondissements_in_department(department);
                let bounds = features_bounds(&features);
                (features, bounds)
            }
            (Some(region), None) => {
                let features = self.boundaries.departments_in_region(region);
                let bounds = features_bounds(&features);
                (features, bounds)
            }
            (None, None) => (self.boundaries.regions().iter().collect(), None),
        };

        ActiveBoundaryLayer {
            level,
            features,
            fit_bounds,
            default_style: level.default_style(),
            hover_style: level.hover_style(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::boundaries::fixtures::sample_boundaries;

    fn engine() -> DrillDownEngine {
        DrillDownEngine::new(Arc::new(sample_boundaries()))
    }

    #[test]
    fn test_initial_state_shows_all_regions() {
        let engine = engine();
        let layer = engine.active_layer();
        assert_eq!(layer.level, BoundaryLevel::Regions);
        assert_eq!(layer.features.len(), 2);
        assert!(layer.fit_bounds.is_none());
    }

    #[test]
    fn test_click_region_shows_its_departments() {
        let mut engine = engine();
        engine.click_region("Centre");

        let layer = engine.active_layer();
        assert_eq!(layer.level, BoundaryLevel::Departments);
        let names: Vec<_> = layer
            .features
            .iter()
            .filter_map(|f| f.string_property("NAME_2"))
            .collect();
        assert_eq!(names, vec!["Mfoundi", "Lekié"]);
        assert!(layer.fit_bounds.is_some());
    }

    #[test]
    fn test_click_unknown_region_is_ignored() {
        let mut engine = engine();
        engine.click_region("Atlantide");
        assert_eq!(engine.state(), &DrillState::default());
    }

    #[test]
    fn test_click_department_requires_matching_parent() {
        let mut engine = engine();
        engine.click_region("Littoral");

        // Mfoundi belongs to Centre, not Littoral
        engine.click_department("Mfoundi");
        assert_eq!(engine.state().active_department, None);

        engine.click_region("Centre");
        engine.click_department("Mfoundi");
        assert_eq!(engine.state().active_department.as_deref(), Some("Mfoundi"));
        assert_eq!(engine.active_layer().level, BoundaryLevel::Arrondissements);
    }

    #[test]
    fn test_department_state_implies_region() {
        let mut engine = engine();
        // Without an active region the click goes nowhere
        engine.click_department("Mfoundi");
        assert_eq!(engine.state().active_department, None);

        engine.advance_to_finest(Some("Mfoundi"));
        assert_eq!(engine.state().active_region.as_deref(), Some("Centre"));
        assert_eq!(engine.state().active_department.as_deref(), Some("Mfoundi"));
    }

    #[test]
    fn test_arrondissement_filter_is_exact() {
        let mut engine = engine();
        engine.advance_to_finest(Some("Mfoundi"));

        let layer = engine.active_layer();
        let names: Vec<_> = layer
            .features
            .iter()
            .filter_map(|f| f.string_property("NAME_3"))
            .collect();
        // The "Mfoundi-Nord" twin department must not leak in
        assert_eq!(names, vec!["Yaoundé I", "Yaoundé II"]);
    }

    #[test]
    fn test_back_steps_one_level() {
        let mut engine = engine();
        engine.advance_to_finest(Some("Mfoundi"));

        engine.back();
        assert_eq!(engine.state().active_department, None);
        assert_eq!(engine.state().active_region.as_deref(), Some("Centre"));

        engine.back();
        assert_eq!(engine.state(), &DrillState::default());

        // No-op at the top
        engine.back();
        assert_eq!(engine.state(), &DrillState::default());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = engine();
        engine.advance_to_finest(Some("Mfoundi"));

        engine.reset();
        let after_once = engine.state().clone();
        engine.reset();
        assert_eq!(engine.state(), &after_once);
        assert_eq!(after_once, DrillState::default());
    }

    #[test]
    fn test_advance_to_unknown_department_is_ignored() {
        let mut engine = engine();
        engine.click_region("Centre");
        let before = engine.state().clone();

        engine.advance_to_finest(Some("Nulle-Part"));
        assert_eq!(engine.state(), &before);

        engine.advance_to_finest(None);
        assert_eq!(engine.state(), &before);
    }
}
