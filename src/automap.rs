//! The seam between the mapper and whatever hosts it, plus the state the
//! mapper publishes through that seam.
//!
//! A `Host` is anything that can accept commands and hold key/value state:
//! the bundled console, a test fake, or a full game front end. The mapper
//! publishes its position as plain variables (`roomid`, `zonename`, ...)
//! so scripts and UI layers can read them without knowing map internals.

use crate::resolver::{Observation, Resolution, resolve};
use crate::room::Room;
use crate::store::ZoneStore;
use crate::zone::Zone;

/// Command and variable access offered by the embedding program.
pub trait Host {
    /// Dispatch a command line as if the player had typed it.
    fn send(&mut self, text: &str);
    /// Read a variable; unset variables read as the empty string.
    fn get(&self, variable: &str) -> String;
    fn set(&mut self, variable: &str, value: &str);
}

/// Write a room's identity into the host variables.
///
/// `roomportals` carries the non-compass move commands joined with `|`
/// ("go bridge|climb ladder"); `roomnote` and `roomcolor` fall back to
/// empty strings.
pub fn publish_room(host: &mut dyn Host, room: &Room) {
    let portals: Vec<&str> = room.non_cardinal_arcs().iter().map(|arc| arc.command.as_str()).collect();
    host.set("roomid", &room.id);
    host.set("roomname", &room.name);
    host.set("roomnote", room.notes.as_deref().unwrap_or_default());
    host.set("roomcolor", room.color.as_deref().unwrap_or_default());
    host.set("roomportals", &portals.join("|"));
}

pub fn publish_zone(host: &mut dyn Host, zone: &Zone) {
    host.set("zoneid", &zone.id);
    host.set("zonename", &zone.name);
}

/// Human-readable listing of a room's non-compass ways out, or `None`
/// when every exit is a compass direction.
pub fn mapped_exits_line(room: &Room) -> Option<String> {
    let portals = room.non_cardinal_arcs();
    if portals.is_empty() {
        return None;
    }
    let moves: Vec<&str> = portals.iter().map(|arc| arc.command.as_str()).collect();
    Some(format!("Mapped exits: {}", moves.join(", ")))
}

/// Feed one observed room through the resolver and publish the outcome.
///
/// The previous position comes from the host's own `roomid` variable, so
/// successive calls walk the map the way the player walks the game. An
/// unresolved observation publishes nothing and leaves earlier state
/// standing.
pub fn observe(store: &mut ZoneStore, host: &mut dyn Host, observation: &Observation) -> Option<Resolution> {
    let previous = host.get("roomid");
    let previous = (!previous.is_empty()).then_some(previous);
    let zone_before = store.current_zone_id().map(ToString::to_string);

    let resolution = resolve(store, observation, previous.as_deref())?;
    if let Some(zone) = store.get(&resolution.zone_id) {
        if zone_before.as_deref() != Some(zone.id.as_str()) {
            publish_zone(host, zone);
        }
        if let Some(room) = zone.room(&resolution.room_id) {
            publish_room(host, room);
        }
    }
    Some(resolution)
}
