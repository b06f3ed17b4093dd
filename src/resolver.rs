//! Fuzzy room resolution: deciding which mapped room the player is
//! standing in from observed game text.
//!
//! Resolution tries the cheapest, most local explanation first and widens
//! from there: rooms adjacent to the previous position, then the current
//! zone, then every zone in the store. Scans walk rooms in file declaration
//! order and zones in ascending id order, so the same observation against
//! the same store always resolves the same way.

use crate::room::Room;
use crate::store::ZoneStore;
use crate::zone::Zone;
use log::{debug, info};

/// What the game told us about the current room.
#[derive(Debug, Clone, Default)]
pub struct Observation {
    pub name: String,
    pub description: String,
    /// Observed exit labels ("obvious paths"). Empty when unknown, which
    /// skips exit comparison entirely.
    pub exits: Vec<String>,
}

/// A resolved position: the room and the zone it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub zone_id: String,
    pub room_id: String,
}

/// Resolve an observation against the store.
///
/// On success the store's current zone follows the result; on failure the
/// store is left untouched and `None` comes back. Not finding a room is an
/// ordinary outcome (unmapped territory), never an error.
pub fn resolve(store: &mut ZoneStore, observation: &Observation, previous_room_id: Option<&str>) -> Option<Resolution> {
    let found = find_in_store(store, observation, previous_room_id)?;
    let found = follow_transfer(store, observation, found);
    store.set_current(&found.zone_id);
    Some(found)
}

fn find_in_store(store: &ZoneStore, observation: &Observation, previous_room_id: Option<&str>) -> Option<Resolution> {
    if let Some(zone) = store.current_zone() {
        // Adjacency first: rooms reachable from where we last stood, in
        // arc declaration order. Transfer rooms are fair game here.
        if let Some(previous) = previous_room_id.and_then(|id| zone.room(id)) {
            for arc in &previous.arcs {
                if let Some(candidate) = zone.room(&arc.destination)
                    && candidate.matches(&observation.name, &observation.description, &observation.exits, false)
                {
                    debug!("resolved room {} via arc '{}' from room {}", candidate.id, arc.exit, previous.id);
                    return Some(Resolution {
                        zone_id: zone.id.clone(),
                        room_id: candidate.id.clone(),
                    });
                }
            }
        }

        if let Some(room) = scan_zone(zone, observation.exits.as_slice(), observation, true) {
            debug!("resolved room {} by scanning zone '{}'", room.id, zone.id);
            return Some(Resolution {
                zone_id: zone.id.clone(),
                room_id: room.id.clone(),
            });
        }
    }

    for zone in store.iter() {
        if let Some(room) = scan_zone(zone, observation.exits.as_slice(), observation, true) {
            debug!("resolved room {} in zone '{}' by global scan", room.id, zone.id);
            return Some(Resolution {
                zone_id: zone.id.clone(),
                room_id: room.id.clone(),
            });
        }
    }
    None
}

fn scan_zone<'a>(zone: &'a Zone, exits: &[String], observation: &Observation, ignore_transfers: bool) -> Option<&'a Room> {
    zone.rooms
        .iter()
        .find(|room| room.matches(&observation.name, &observation.description, exits, ignore_transfers))
}

/// When resolution lands on a transfer room, chase the zone file named in
/// its notes and try to re-match on the far side. Exits don't carry across
/// a zone border, so the re-match checks name and description only. Any
/// failure keeps the transfer room itself.
fn follow_transfer(store: &ZoneStore, observation: &Observation, found: Resolution) -> Resolution {
    let Some(room) = store.get(&found.zone_id).and_then(|zone| zone.room(&found.room_id)) else {
        return found;
    };
    if !room.is_transfer() {
        return found;
    }
    let Some(file) = room.transfer_file() else {
        return found;
    };
    let Some(target) = store.get_by_file(file) else {
        info!("transfer room {} names zone file '{file}' which is not loaded", room.id);
        return found;
    };
    match scan_zone(target, &[], observation, false) {
        Some(hit) => {
            info!("transferring into zone '{}' ({}) at room {}", target.name, target.file, hit.id);
            Resolution {
                zone_id: target.id.clone(),
                room_id: hit.id.clone(),
            }
        },
        None => found,
    }
}
