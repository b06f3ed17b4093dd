//! The zone store: every loaded zone plus the current-zone pointer.
//!
//! Zones are held in a `BTreeMap` keyed by zone id so that whole-store
//! scans walk a stable, documented order (lexicographic by id). The
//! resolver's global fallback depends on that stability.

use crate::zone::Zone;
use log::warn;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct ZoneStore {
    zones: BTreeMap<String, Zone>,
    /// Zone file name ("map2.xml") to zone id, for transfer hops.
    files: HashMap<String, String>,
    current: Option<String>,
}
impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone, replacing any earlier zone with the same id.
    pub fn insert(&mut self, zone: Zone) {
        if self.zones.contains_key(&zone.id) {
            warn!("duplicate zone id '{}' ({}); later file replaces earlier", zone.id, zone.file);
        }
        self.files.insert(zone.file.clone(), zone.id.clone());
        self.zones.insert(zone.id.clone(), zone);
    }

    pub fn get(&self, id: &str) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn get_by_file(&self, file: &str) -> Option<&Zone> {
        self.files.get(file).and_then(|id| self.zones.get(id))
    }

    /// All zones in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn current_zone(&self) -> Option<&Zone> {
        self.current.as_ref().and_then(|id| self.zones.get(id))
    }

    pub fn current_zone_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Point the store at a zone. An unknown id clears the pointer instead,
    /// so a stale current zone can't linger after a bad switch.
    pub fn set_current(&mut self, id: &str) -> bool {
        if self.zones.contains_key(id) {
            self.current = Some(id.to_string());
            true
        } else {
            warn!("cannot make '{id}' current: no such zone");
            self.current = None;
            false
        }
    }

    /// Swap in a freshly loaded store, keeping the current-zone pointer
    /// only if that zone id survived the reload.
    pub fn replace(&mut self, fresh: ZoneStore) {
        let keep = self.current.take().filter(|id| fresh.zones.contains_key(id));
        *self = fresh;
        self.current = keep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, file: &str) -> Zone {
        Zone::new(id, format!("Zone {id}"), file)
    }

    #[test]
    fn insert_and_lookup_by_id_and_file() {
        let mut store = ZoneStore::new();
        store.insert(zone("1", "map1.xml"));
        store.insert(zone("2", "map2.xml"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("2").unwrap().file, "map2.xml");
        assert_eq!(store.get_by_file("map1.xml").unwrap().id, "1");
        assert!(store.get_by_file("map9.xml").is_none());
    }

    #[test]
    fn iter_walks_ascending_id_order() {
        let mut store = ZoneStore::new();
        store.insert(zone("2", "b.xml"));
        store.insert(zone("10", "c.xml"));
        store.insert(zone("1", "a.xml"));

        let ids: Vec<&str> = store.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "10", "2"]);
    }

    #[test]
    fn duplicate_zone_id_last_file_wins() {
        let mut store = ZoneStore::new();
        store.insert(zone("1", "old.xml"));
        store.insert(zone("1", "new.xml"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().file, "new.xml");
    }

    #[test]
    fn set_current_rejects_unknown_and_clears() {
        let mut store = ZoneStore::new();
        store.insert(zone("1", "map1.xml"));

        assert!(store.set_current("1"));
        assert_eq!(store.current_zone().unwrap().id, "1");

        assert!(!store.set_current("9"));
        assert!(store.current_zone().is_none());
    }

    #[test]
    fn replace_keeps_current_only_if_it_survives() {
        let mut store = ZoneStore::new();
        store.insert(zone("1", "map1.xml"));
        store.insert(zone("2", "map2.xml"));
        store.set_current("2");

        let mut fresh = ZoneStore::new();
        fresh.insert(zone("2", "map2.xml"));
        store.replace(fresh);
        assert_eq!(store.current_zone_id(), Some("2"));

        let mut fresh = ZoneStore::new();
        fresh.insert(zone("3", "map3.xml"));
        store.replace(fresh);
        assert!(store.current_zone_id().is_none());
    }
}
