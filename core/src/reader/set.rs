use crate::prelude::{CoverageError, CoverageResult, GridSize};
use crate::reader::descriptor::{ReaderDescriptor, DEFAULT_RADIUS_M};
use std::collections::HashSet;

/// Reader layout used when the site configuration does not list its own.
const DEFAULT_LAYOUT: [(&str, f64, f64); 13] = [
    ("01", 510.0, 1910.0),
    ("02", 510.0, 1202.0),
    ("03", 525.0, 485.0),
    ("04", 1650.0, 2125.0),
    ("05", 1660.0, 1400.0),
    ("06", 1340.0, 1110.0),
    ("07", 1570.0, 390.0),
    ("08", 2050.0, 1800.0),
    ("09", 2340.0, 1152.0),
    ("10", 2100.0, 450.0),
    ("11", 2900.0, 1910.0),
    ("12", 3000.0, 1202.0),
    ("13", 3040.0, 600.0),
];

/// Ordered collection of readers with unique ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderSet {
    readers: Vec<ReaderDescriptor>,
}

impl ReaderSet {
    pub fn new(readers: Vec<ReaderDescriptor>) -> CoverageResult<Self> {
        let mut seen = HashSet::new();
        for reader in &readers {
            if !seen.insert(reader.id.as_str()) {
                return Err(CoverageError::InvalidReader(format!(
                    "duplicate reader id {}",
                    reader.id
                )));
            }
        }
        Ok(Self { readers })
    }

    /// The built-in layout, every reader at the given radius.
    pub fn defaults(radius_meters: f64) -> Self {
        let readers = DEFAULT_LAYOUT
            .iter()
            .map(|&(id, x, y)| ReaderDescriptor::new(id, x, y, radius_meters))
            .collect();
        Self { readers }
    }

    pub fn as_slice(&self) -> &[ReaderDescriptor] {
        &self.readers
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReaderDescriptor> {
        self.readers.iter()
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ReaderDescriptor> {
        self.readers.iter().find(|reader| reader.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ReaderDescriptor> {
        self.readers.iter_mut().find(|reader| reader.id == id)
    }

    /// Replaces the reader with the same id, or appends it when unknown.
    pub fn apply_override(&mut self, reader: ReaderDescriptor) {
        match self.get_mut(&reader.id) {
            Some(existing) => *existing = reader,
            None => self.readers.push(reader),
        }
    }

    pub fn validate(&self, grid: GridSize) -> CoverageResult<()> {
        self.readers
            .iter()
            .try_for_each(|reader| reader.validate(grid))
    }
}

impl Default for ReaderSet {
    fn default() -> Self {
        Self::defaults(DEFAULT_RADIUS_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_thirteen_readers() {
        let set = ReaderSet::default();
        assert_eq!(set.len(), 13);
        let first = set.get("01").unwrap();
        assert_eq!((first.position.x, first.position.y), (510.0, 1910.0));
        assert_eq!(first.radius_meters, 75.0);
        assert!(set.get("14").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let readers = vec![
            ReaderDescriptor::new("01", 0.0, 0.0, 30.0),
            ReaderDescriptor::new("01", 5.0, 5.0, 30.0),
        ];
        assert!(matches!(
            ReaderSet::new(readers),
            Err(CoverageError::InvalidReader(_))
        ));
    }

    #[test]
    fn override_replaces_only_matching_id() {
        let mut set = ReaderSet::default();
        set.apply_override(ReaderDescriptor::new("05", 10.0, 20.0, 40.0));
        set.apply_override(ReaderDescriptor::new("99", 1.0, 2.0, 30.0));
        assert_eq!(set.len(), 14);
        assert_eq!(set.get("05").unwrap().radius_meters, 40.0);
        assert_eq!(set.get("06").unwrap().position.x, 1340.0);
        assert_eq!(set.as_slice().last().unwrap().id, "99");
    }
}
