use crate::{
    core::geo::LatLngBounds,
    data::geojson::{Feature, GeoJson},
    Result,
};

use std::path::Path;

/// Administrative levels of the Cameroon reference datasets, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminLevel {
    Country,
    Region,
    Department,
    Arrondissement,
}

impl AdminLevel {
    /// Property key holding a feature's own name at this level
    pub fn name_key(&self) -> Option<&'static str> {
        match self {
            AdminLevel::Country => None,
            AdminLevel::Region => Some("NAME_1"),
            AdminLevel::Department => Some("NAME_2"),
            AdminLevel::Arrondissement => Some("NAME_3"),
        }
    }

    /// Property key holding a feature's parent name, used as the join key
    /// for drill-down filtering
    pub fn parent_key(&self) -> Option<&'static str> {
        match self {
            AdminLevel::Country | AdminLevel::Region => None,
            AdminLevel::Department => Some("NAME_1"),
            AdminLevel::Arrondissement => Some("NAME_2"),
        }
    }
}

/// The four immutable administrative boundary collections, loaded once at
/// startup and never mutated.
pub struct ReferenceBoundaries {
    country: Vec<Feature>,
    regions: Vec<Feature>,
    departments: Vec<Feature>,
    arrondissements: Vec<Feature>,
}

impl ReferenceBoundaries {
    /// Loads the four datasets from raw GeoJSON strings (country, regions,
    /// departments, arrondissements)
    pub fn from_geojson_strs(
        country: &str,
        regions: &str,
        departments: &str,
        arrondissements: &str,
    ) -> Result<Self> {
        let boundaries = Self {
            country: GeoJson::from_str(country)?.into_features(),
            regions: GeoJson::from_str(regions)?.into_features(),
            departments: GeoJson::from_str(departments)?.into_features(),
            arrondissements: GeoJson::from_str(arrondissements)?.into_features(),
        };
        log::info!(
            "loaded boundaries: {} region(s), {} department(s), {} arrondissement(s)",
            boundaries.regions.len(),
            boundaries.departments.len(),
            boundaries.arrondissements.len()
        );
        Ok(boundaries)
    }

    /// Loads the datasets from a directory holding the four files
    /// `cm1.geojson.json` … `cm4.geojson.json` (country through
    /// arrondissements)
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| std::fs::read_to_string(dir.join(name));
        Self::from_geojson_strs(
            &read("cm1.geojson.json")?,
            &read("cm2.geojson.json")?,
            &read("cm3.geojson.json")?,
            &read("cm4.geojson.json")?,
        )
    }

    pub fn country(&self) -> &[Feature] {
        &self.country
    }

    pub fn regions(&self) -> &[Feature] {
        &self.regions
    }

    pub fn departments(&self) -> &[Feature] {
        &self.departments
    }

    pub fn arrondissements(&self) -> &[Feature] {
        &self.arrondissements
    }

    /// Departments whose parent region name equals `region` exactly
    /// (case-sensitive; non-matching features are excluded, not hidden).
    ///
    /// Names are the join keys between datasets; diacritic or case
    /// mismatches between files would silently miss here, so the datasets
    /// must agree on spelling.
    pub fn departments_in_region(&self, region: &str) -> Vec<&Feature> {
        filter_by_parent(&self.departments, AdminLevel::Department, region)
    }

    /// Arrondissements whose parent department name equals `department`
    /// exactly
    pub fn arrondissements_in_department(&self, department: &str) -> Vec<&Feature> {
        filter_by_parent(
            &self.arrondissements,
            AdminLevel::Arrondissement,
            department,
        )
    }

    /// Looks up a region feature by name
    pub fn region(&self, name: &str) -> Option<&Feature> {
        self.regions
            .iter()
            .find(|f| f.string_property("NAME_1") == Some(name))
    }

    /// Looks up a department feature by name
    pub fn department(&self, name: &str) -> Option<&Feature> {
        self.departments
            .iter()
            .find(|f| f.string_property("NAME_2") == Some(name))
    }
}

fn filter_by_parent<'a>(
    features: &'a [Feature],
    level: AdminLevel,
    parent: &str,
) -> Vec<&'a Feature> {
    let Some(key) = level.parent_key() else {
        return Vec::new();
    };
    features
        .iter()
        .filter(|f| f.string_property(key) == Some(parent))
        .collect()
}

/// Bounding box of a filtered feature set, for viewport fitting
pub fn features_bounds(features: &[&Feature]) -> Option<LatLngBounds> {
    let mut bounds: Option<LatLngBounds> = None;
    for feature in features {
        if let Some(feature_bounds) = feature.bounds() {
            bounds = Some(match bounds {
                Some(b) => b.union(&feature_bounds),
                None => feature_bounds,
            });
        }
    }
    bounds
}
