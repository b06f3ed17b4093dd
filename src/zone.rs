//! A zone: one map file's worth of rooms and labels.
//!
//! Rooms stay in file declaration order (scan order matters to the
//! resolver) with an id index maintained alongside for direct lookup.

use crate::room::{Position, Room};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free-floating caption drawn on the map ("River", "To the Keep").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub position: Position,
}

/// All rooms and labels loaded from a single zone file.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    /// File name this zone was loaded from ("map2.xml"), the key transfer
    /// rooms use to name it.
    pub file: String,
    pub rooms: Vec<Room>,
    pub labels: Vec<Label>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}
impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file: file.into(),
            rooms: Vec::new(),
            labels: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a room, keeping the id index in step. A room reusing an
    /// earlier id stays in the list but takes over the index entry.
    pub fn add_room(&mut self, room: Room) {
        self.index.insert(room.id.clone(), self.rooms.len());
        self.rooms.push(room);
    }

    /// Look a room up by id. The empty id never matches; unexplored arcs
    /// carry empty destinations and must not resolve anywhere.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.room_index(id).map(|i| &self.rooms[i])
    }

    /// Position of a room in `rooms`, as maintained by `add_room`. The
    /// pathfinder keys its bookkeeping on these indexes.
    pub fn room_index(&self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.index.get(id).copied()
    }

    /// Rooms whose notes match a fragment, in declaration order.
    ///
    /// Notes are `|`-separated components ("bank|teller window"); a room
    /// matches when any component starts with the fragment,
    /// case-insensitively.
    pub fn rooms_with_note(&self, fragment: &str) -> Vec<&Room> {
        let check = fragment.to_lowercase();
        self.rooms
            .iter()
            .filter(|room| {
                room.notes.as_ref().is_some_and(|notes| {
                    notes.to_lowercase().split('|').any(|part| part.starts_with(&check))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, name: &str, notes: Option<&str>) -> Room {
        Room {
            id: id.into(),
            name: name.into(),
            descriptions: vec!["A room.".into()],
            notes: notes.map(Into::into),
            color: None,
            position: Position::default(),
            arcs: Vec::new(),
        }
    }

    #[test]
    fn add_room_enables_id_lookup() {
        let mut zone = Zone::new("1", "Riverside", "map1.xml");
        zone.add_room(room("10", "Riverside, Landing", None));
        zone.add_room(room("11", "Riverside, Dock Street", None));

        assert_eq!(zone.room("11").unwrap().name, "Riverside, Dock Street");
        assert!(zone.room("99").is_none());
    }

    #[test]
    fn empty_id_never_resolves() {
        let mut zone = Zone::new("1", "Riverside", "map1.xml");
        zone.add_room(room("10", "Riverside, Landing", None));

        assert!(zone.room("").is_none());
    }

    #[test]
    fn duplicate_id_keeps_both_rooms_but_last_wins_lookup() {
        let mut zone = Zone::new("1", "Riverside", "map1.xml");
        zone.add_room(room("10", "Old Landing", None));
        zone.add_room(room("10", "New Landing", None));

        assert_eq!(zone.rooms.len(), 2);
        assert_eq!(zone.room("10").unwrap().name, "New Landing");
    }

    #[test]
    fn rooms_with_note_matches_component_prefixes() {
        let mut zone = Zone::new("1", "Riverside", "map1.xml");
        zone.add_room(room("10", "First Bank of Riverside", Some("Bank|teller window")));
        zone.add_room(room("11", "Dock Street", Some("ferry tickets")));
        zone.add_room(room("12", "Alley", None));

        let hits: Vec<&str> = zone.rooms_with_note("bank").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(hits, vec!["10"]);

        let hits: Vec<&str> = zone.rooms_with_note("teller").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(hits, vec!["10"]);

        assert!(zone.rooms_with_note("vault").is_empty());
    }

    #[test]
    fn rooms_with_note_returns_declaration_order() {
        let mut zone = Zone::new("1", "Riverside", "map1.xml");
        zone.add_room(room("12", "North Gate", Some("gate")));
        zone.add_room(room("10", "South Gate", Some("gate|south")));

        let hits: Vec<&str> = zone.rooms_with_note("gate").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(hits, vec!["12", "10"]);
    }
}
