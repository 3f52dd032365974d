use crate::core::geo::{LatLng, LatLngBounds};

use std::collections::HashSet;

/// Handle to a record in the [`PolygonStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub u64);

/// Administrative names attached to an extraction result; free text, either
/// may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdministrativeNames {
    pub arrondissement: Option<String>,
    pub department: Option<String>,
}

/// One accepted polygon extraction result.
///
/// All measurements arrive precomputed from the processing backend and are
/// stored verbatim; nothing is recomputed or clamped client-side.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    pub id: RecordId,
    /// Polygon outline as an ordered closed ring; may be empty or
    /// degenerate, in which case the record degrades to a list entry only
    pub ring: Vec<LatLng>,
    pub bounds: Option<LatLngBounds>,
    pub centroid: Option<LatLng>,
    pub perimeter: f64,
    pub area: f64,
    /// Headline surface figure shown in the popup, in m²
    pub area_value: f64,
    pub administrative_names: AdministrativeNames,
    pub owner_name: Option<String>,
}

impl PolygonRecord {
    /// The ring, if it satisfies the rendering invariant: at least four
    /// points with first == last (a closed ring). Otherwise the record
    /// cannot be rendered as a shape.
    pub fn renderable_ring(&self) -> Option<&[LatLng]> {
        if self.ring.len() >= 4 && self.ring.first() == self.ring.last() {
            Some(&self.ring)
        } else {
            None
        }
    }

    /// Display name for list entries: the arrondissement when known
    pub fn display_name(&self) -> &str {
        self.administrative_names
            .arrondissement
            .as_deref()
            .unwrap_or("Parcelle sans nom")
    }
}

/// Process-wide store of accepted polygon records.
///
/// Records are append-only in arrival order; there is no deletion, update,
/// or deduplication. The selection pointer always refers to a record in the
/// store (or nothing) and can never dangle.
#[derive(Default)]
pub struct PolygonStore {
    records: Vec<PolygonRecord>,
    selected: Option<usize>,
    next_id: u64,
}

impl PolygonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and atomically selects it (auto-select-newest).
    /// The store assigns the record id.
    pub fn append(&mut self, mut record: PolygonRecord) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        record.id = id;
        self.records.push(record);
        self.selected = Some(self.records.len() - 1);
        log::debug!("appended record {:?}, {} record(s) total", id, self.records.len());
        id
    }

    /// Selects an existing record; a no-op if the id is not present
    pub fn select(&mut self, id: RecordId) {
        if let Some(index) = self.records.iter().position(|r| r.id == id) {
            self.selected = Some(index);
        }
    }

    /// The currently selected record, if any
    pub fn current_selection(&self) -> Option<&PolygonRecord> {
        self.selected.and_then(|i| self.records.get(i))
    }

    pub fn get(&self, id: RecordId) -> Option<&PolygonRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Read-only iteration in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &PolygonRecord> {
        self.records.iter()
    }

    /// The most recently appended record
    pub fn newest(&self) -> Option<&PolygonRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct department names across records (sidebar stat)
    pub fn distinct_departments(&self) -> usize {
        self.records
            .iter()
            .filter_map(|r| r.administrative_names.department.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }
}
