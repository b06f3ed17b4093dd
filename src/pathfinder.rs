//! Route finding within a zone.
//!
//! A* over room arcs, with straight-line (x, y) distance as the heuristic
//! and per-arc declared costs (default 1) as edge weights. Search records
//! live in a flat arena and point at their parents by index, so a finished
//! search drops in one go.
//!
//! "No route" is an ordinary answer: unknown endpoints, unreachable
//! targets, and start == target all come back as an empty path.

use crate::zone::Zone;
use anyhow::{Result, anyhow, bail};
use log::debug;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// One node in the search arena. `room` indexes into `Zone::rooms`;
/// `parent` indexes into the arena itself.
struct SearchRecord {
    room: usize,
    parent: Option<usize>,
    g: i64,
}

/// Find the cheapest route between two rooms.
///
/// Returns the room ids from start to target inclusive, or an empty list
/// when there is nothing to do (unknown ids, no route, already there).
pub fn find_room_path(zone: &Zone, start_id: &str, target_id: &str) -> Vec<String> {
    if start_id == target_id {
        return Vec::new();
    }
    let (Some(start), Some(target)) = (zone.room_index(start_id), zone.room_index(target_id)) else {
        return Vec::new();
    };
    let target_pos = zone.rooms[target].position;

    let mut arena = vec![SearchRecord {
        room: start,
        parent: None,
        g: 0,
    }];
    let mut best_g: HashMap<usize, i64> = HashMap::from([(start, 0)]);
    let mut closed = vec![false; zone.rooms.len()];
    // Entries are (f, room index, arena handle) under Reverse, so pops come
    // cheapest-f first with ties broken by room declaration order.
    let mut open: BinaryHeap<Reverse<(i64, usize, usize)>> = BinaryHeap::new();
    open.push(Reverse((zone.rooms[start].position.flat_distance(&target_pos), start, 0)));

    while let Some(Reverse((_, room_idx, handle))) = open.pop() {
        if closed[room_idx] {
            continue;
        }
        closed[room_idx] = true;
        if room_idx == target {
            debug!("path {start_id} -> {target_id}: {} arena records, g = {}", arena.len(), arena[handle].g);
            return reconstruct(zone, &arena, handle);
        }

        let g_here = arena[handle].g;
        for arc in zone.rooms[room_idx].filtered_arcs() {
            let Some(next) = zone.room_index(&arc.destination) else {
                continue;
            };
            if next == room_idx || closed[next] {
                continue;
            }
            let g = g_here + arc.move_cost();
            // Only a strictly cheaper route re-parents an open room.
            if best_g.get(&next).is_some_and(|&old| g >= old) {
                continue;
            }
            best_g.insert(next, g);
            arena.push(SearchRecord {
                room: next,
                parent: Some(handle),
                g,
            });
            let f = g + zone.rooms[next].position.flat_distance(&target_pos);
            open.push(Reverse((f, next, arena.len() - 1)));
        }
    }

    debug!("no path from {start_id} to {target_id} in zone '{}'", zone.id);
    Vec::new()
}

fn reconstruct(zone: &Zone, arena: &[SearchRecord], handle: usize) -> Vec<String> {
    let mut ids = Vec::new();
    let mut cursor = Some(handle);
    while let Some(h) = cursor {
        let record = &arena[h];
        ids.push(zone.rooms[record.room].id.clone());
        cursor = record.parent;
    }
    ids.reverse();
    ids
}

/// Turn a room-id path into the move commands that walk it.
///
/// # Errors
/// Errs when adjacent rooms in the path have no connecting arc; by
/// construction the pathfinder never produces such a pair, so hitting one
/// means the zone changed underneath us.
pub fn moves_for_path(zone: &Zone, ids: &[String]) -> Result<Vec<String>> {
    let mut moves = Vec::with_capacity(ids.len().saturating_sub(1));
    for pair in ids.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let room = zone
            .room(from)
            .ok_or_else(|| anyhow!("room {from} missing from zone '{}'", zone.id))?;
        let Some(arc) = room.arc_to(to) else {
            bail!("no arc from room {from} to room {to} in zone '{}'", zone.id);
        };
        moves.push(arc.command.clone());
    }
    Ok(moves)
}

/// Route between two rooms as ready-to-send move commands.
///
/// # Errors
/// Errs only on an internally inconsistent zone (see [`moves_for_path`]);
/// "no route" is `Ok` with an empty list.
pub fn find_path(zone: &Zone, start_id: &str, target_id: &str) -> Result<Vec<String>> {
    let ids = find_room_path(zone, start_id, target_id);
    moves_for_path(zone, &ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{Arc, Position, Room};

    fn room(id: &str, x: i32, y: i32) -> Room {
        Room {
            id: id.into(),
            name: format!("Room {id}"),
            descriptions: vec!["A room.".into()],
            notes: None,
            color: None,
            position: Position { x, y, z: 0 },
            arcs: Vec::new(),
        }
    }

    fn arc(exit: &str, destination: &str) -> Arc {
        Arc {
            exit: exit.into(),
            command: exit.into(),
            destination: destination.into(),
            hidden: false,
            cost: None,
        }
    }

    fn costed(exit: &str, destination: &str, cost: i64) -> Arc {
        Arc {
            cost: Some(cost),
            ..arc(exit, destination)
        }
    }

    /// 1 -> 2 -> 3 -> 4 in a straight north line.
    fn corridor() -> Zone {
        let mut zone = Zone::new("1", "Corridor", "corridor.xml");
        for (id, y, exits) in [
            ("1", 0, vec![arc("north", "2")]),
            ("2", 1, vec![arc("south", "1"), arc("north", "3")]),
            ("3", 2, vec![arc("south", "2"), arc("north", "4")]),
            ("4", 3, vec![arc("south", "3")]),
        ] {
            let mut r = room(id, 0, y);
            r.arcs = exits;
            zone.add_room(r);
        }
        zone
    }

    #[test]
    fn walks_a_straight_corridor() {
        let zone = corridor();

        let ids = find_room_path(&zone, "1", "4");
        assert_eq!(ids, vec!["1", "2", "3", "4"]);

        let moves = find_path(&zone, "1", "4").unwrap();
        assert_eq!(moves, vec!["north", "north", "north"]);
    }

    #[test]
    fn start_equals_target_is_empty() {
        let zone = corridor();
        assert!(find_room_path(&zone, "2", "2").is_empty());
        assert_eq!(find_path(&zone, "2", "2").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn unknown_endpoints_are_empty() {
        let zone = corridor();
        assert!(find_room_path(&zone, "9", "4").is_empty());
        assert!(find_room_path(&zone, "1", "9").is_empty());
    }

    #[test]
    fn unreachable_target_is_empty() {
        let mut zone = corridor();
        zone.add_room(room("5", 10, 10)); // island

        assert!(find_room_path(&zone, "1", "5").is_empty());
        assert_eq!(find_path(&zone, "1", "5").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn equal_cost_tie_goes_to_declaration_order() {
        // Diamond: 1 -> 2 -> 4 and 1 -> 3 -> 4 cost the same; the route
        // through the earlier-declared room must win every run.
        let mut zone = Zone::new("1", "Diamond", "diamond.xml");
        let mut start = room("1", 0, 0);
        start.arcs = vec![arc("northwest", "2"), arc("northeast", "3")];
        zone.add_room(start);
        let mut west = room("2", -1, 1);
        west.arcs = vec![arc("northeast", "4")];
        zone.add_room(west);
        let mut east = room("3", 1, 1);
        east.arcs = vec![arc("northwest", "4")];
        zone.add_room(east);
        zone.add_room(room("4", 0, 2));

        assert_eq!(find_room_path(&zone, "1", "4"), vec!["1", "2", "4"]);
    }

    #[test]
    fn declared_cost_reroutes_around_the_short_way() {
        // The straight middle arc costs 10; the geometric detour costs 3.
        let mut zone = Zone::new("1", "Tollgate", "toll.xml");
        let mut start = room("1", 0, 0);
        start.arcs = vec![costed("east", "2", 10), arc("north", "3")];
        zone.add_room(start);
        zone.add_room(room("2", 2, 0));
        let mut up = room("3", 0, 1);
        up.arcs = vec![arc("east", "4")];
        zone.add_room(up);
        let mut over = room("4", 2, 1);
        over.arcs = vec![arc("south", "2")];
        zone.add_room(over);

        assert_eq!(find_room_path(&zone, "1", "2"), vec!["1", "3", "4", "2"]);
    }

    #[test]
    fn heuristic_detour_still_finds_cheapest_route() {
        // The geometrically longer dogleg is far cheaper than the straight
        // line; the search has to look past its heuristic.
        let mut zone = Zone::new("1", "Dogleg", "dogleg.xml");
        let mut start = room("1", 0, 0);
        start.arcs = vec![costed("east", "2", 5), arc("northeast", "3")];
        zone.add_room(start);
        let mut mid = room("2", 5, 0);
        mid.arcs = vec![costed("east", "4", 5)];
        zone.add_room(mid);
        let mut high = room("3", 5, 5);
        high.arcs = vec![arc("southeast", "4")];
        zone.add_room(high);
        zone.add_room(room("4", 10, 0));

        assert_eq!(find_room_path(&zone, "1", "4"), vec!["1", "3", "4"]);
    }

    #[test]
    fn hidden_arcs_are_still_walkable() {
        let mut zone = Zone::new("1", "Cellar", "cellar.xml");
        let mut start = room("1", 0, 0);
        let mut trapdoor = arc("down", "2");
        trapdoor.hidden = true;
        start.arcs = vec![trapdoor];
        zone.add_room(start);
        zone.add_room(room("2", 0, -1));

        assert_eq!(find_room_path(&zone, "1", "2"), vec!["1", "2"]);
    }

    #[test]
    fn moves_come_from_arc_commands() {
        let mut zone = Zone::new("1", "Wall", "wall.xml");
        let mut start = room("1", 0, 0);
        let mut ladder = arc("ladder", "2");
        ladder.command = "climb ladder".into();
        start.arcs = vec![ladder];
        zone.add_room(start);
        zone.add_room(room("2", 0, 1));

        assert_eq!(find_path(&zone, "1", "2").unwrap(), vec!["climb ladder"]);
    }

    #[test]
    fn moves_for_disconnected_pair_is_an_error() {
        let zone = corridor();
        let ids = vec!["1".to_string(), "3".to_string()];

        assert!(moves_for_path(&zone, &ids).is_err());
    }
}
