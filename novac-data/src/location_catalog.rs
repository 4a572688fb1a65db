//! An instrument-location catalog: the set of placements/configurations a serial has
//! had over its lifetime, rejecting insertions whose validity interval overlaps an
//! existing one for the same serial (§3's invariant), and resolving "where was serial
//! X at time T" queries for the geometry and flux stages.

use chrono::{DateTime, Utc};

use novac_model::meta::InstrumentLocation;

use crate::result::{Error, Result};

/// An immutable-after-load catalog of instrument placements, keyed by serial.
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    locations: Vec<InstrumentLocation>,
}

impl LocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a location, rejecting it if its validity interval overlaps an existing
    /// entry for the same serial.
    pub fn insert(&mut self, location: InstrumentLocation) -> Result<()> {
        if self.locations.iter().any(|existing| existing.serial() == location.serial() && existing.overlaps(&location)) {
            return Err(Error::OverlappingValidityInterval { serial: location.serial().to_string() });
        }
        self.locations.push(location);
        Ok(())
    }

    /// Build a catalog from an iterator, surfacing the first overlap encountered.
    pub fn from_locations(locations: impl IntoIterator<Item = InstrumentLocation>) -> Result<Self> {
        let mut catalog = Self::new();
        for location in locations {
            catalog.insert(location)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentLocation> {
        self.locations.iter()
    }

    /// The location of `serial` valid at `time`, if any.
    pub fn find(&self, serial: &str, time: DateTime<Utc>) -> Option<&InstrumentLocation> {
        self.locations.iter().find(|loc| loc.serial() == serial && loc.contains(time))
    }

    /// All serials known to the catalog, deduplicated, in first-seen order.
    pub fn serials(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for location in &self.locations {
            if !seen.contains(&location.serial()) {
                seen.push(location.serial());
            }
        }
        seen
    }

    /// The highest-altitude location on record for `volcano`, used to seed a default
    /// plume height from the volcano peak altitude at startup (§4.6).
    pub fn highest(&self, volcano: &str) -> Option<&InstrumentLocation> {
        self.locations.iter().filter(|loc| loc.volcano() == volcano).max_by(|a, b| a.altitude_masl().total_cmp(&b.altitude_masl()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use novac_model::data::InstrumentType;

    fn location(serial: &str, from: i32, to: i32, altitude: f64) -> InstrumentLocation {
        location_at_volcano(serial, from, to, altitude, "Kilauea")
    }

    fn location_at_volcano(serial: &str, from: i32, to: i32, altitude: f64, volcano: &str) -> InstrumentLocation {
        InstrumentLocation::new(
            serial,
            Utc.with_ymd_and_hms(from, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(to, 1, 1, 0, 0, 0).unwrap(),
            19.4,
            -155.3,
            altitude,
            0.0,
            90.0,
            0.0,
            InstrumentType::Gothenburg,
            volcano,
        )
    }

    #[test]
    fn rejects_overlapping_intervals_for_same_serial() {
        let mut catalog = LocationCatalog::new();
        catalog.insert(location("A", 2020, 2022, 1200.0)).unwrap();
        let result = catalog.insert(location("A", 2021, 2023, 1250.0));
        assert!(matches!(result, Err(Error::OverlappingValidityInterval { .. })));
    }

    #[test]
    fn allows_overlapping_intervals_for_different_serials() {
        let mut catalog = LocationCatalog::new();
        catalog.insert(location("A", 2020, 2022, 1200.0)).unwrap();
        assert!(catalog.insert(location("B", 2021, 2023, 1300.0)).is_ok());
    }

    #[test]
    fn finds_location_valid_at_time() {
        let mut catalog = LocationCatalog::new();
        catalog.insert(location("A", 2020, 2022, 1200.0)).unwrap();
        catalog.insert(location("A", 2022, 2024, 1250.0)).unwrap();

        let at = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let found = catalog.find("A", at).unwrap();
        assert_eq!(found.altitude_masl(), 1250.0);
    }

    #[test]
    fn highest_picks_greatest_altitude() {
        let mut catalog = LocationCatalog::new();
        catalog.insert(location("A", 2020, 2022, 1200.0)).unwrap();
        catalog.insert(location("B", 2020, 2022, 1800.0)).unwrap();
        assert_eq!(catalog.highest("Kilauea").unwrap().serial(), "B");
    }

    #[test]
    fn highest_ignores_instruments_at_other_volcanoes() {
        let mut catalog = LocationCatalog::new();
        catalog.insert(location_at_volcano("A", 2020, 2022, 1200.0, "Kilauea")).unwrap();
        catalog.insert(location_at_volcano("B", 2020, 2022, 3000.0, "Etna")).unwrap();
        assert_eq!(catalog.highest("Kilauea").unwrap().serial(), "A");
        assert_eq!(catalog.highest("Etna").unwrap().serial(), "B");
        assert!(catalog.highest("Fuji").is_none());
    }
}
