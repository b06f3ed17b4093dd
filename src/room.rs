//! Map data model: positions, arcs, and rooms.
//!
//! A zone file describes rooms joined by directed arcs. Rooms carry the
//! name, descriptions, and exit vocabulary the resolver matches game text
//! against, plus the grid position the pathfinder uses for its distance
//! heuristic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Exit labels that count as compass-style directions when comparing a
/// room's exits against an observed exit list. Anything else ("go gate",
/// "climb ladder") is a portal and excluded from that comparison.
pub const CARDINAL_DIRS: [&str; 11] = [
    "north",
    "south",
    "east",
    "west",
    "northeast",
    "northwest",
    "southeast",
    "southwest",
    "out",
    "up",
    "down",
];

lazy_static! {
    static ref TRANSFER_FILE: Regex = Regex::new(r"(\S+\.xml)").unwrap();
}

/// Grid placement of a room within its zone. Zones are drawn on an integer
/// grid; `z` separates stacked floors and never enters distance math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}
impl Position {
    /// Straight-line distance to `other` on the (x, y) plane, truncated to
    /// an integer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn flat_distance(&self, other: &Position) -> i64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy) as i64
    }
}

/// A directed connection out of a room.
///
/// `exit` is the label shown in game exit lists ("north", "go bridge");
/// `command` is the text actually sent to traverse the arc, stored under
/// the map-file name `move`. An empty `destination` marks an unexplored
/// exit that leads nowhere yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    pub exit: String,
    #[serde(rename = "move")]
    pub command: String,
    pub destination: String,
    pub hidden: bool,
    #[serde(default)]
    pub cost: Option<i64>,
}
impl Arc {
    pub fn has_destination(&self) -> bool {
        !self.destination.is_empty()
    }

    /// Destination id as a number, for ordering only. Non-numeric ids sort
    /// as zero.
    pub fn destination_value(&self) -> i64 {
        self.destination.parse().unwrap_or(0)
    }

    /// Traversal cost declared on the arc, defaulting to a uniform 1.
    pub fn move_cost(&self) -> i64 {
        self.cost.unwrap_or(1)
    }
}

/// One mapped room.
///
/// `descriptions` holds every description variant mapped for the room
/// (lighting and season can change the text); a room matches an observed
/// description when any stored variant is a prefix of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub descriptions: Vec<String>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub position: Position,
    pub arcs: Vec<Arc>,
}
impl Room {
    /// Labels of this room's compass-style exits, sorted ascending.
    pub fn cardinal_exits(&self) -> Vec<&str> {
        let mut exits: Vec<&str> = self
            .arcs
            .iter()
            .filter(|arc| CARDINAL_DIRS.contains(&arc.exit.as_str()))
            .map(|arc| arc.exit.as_str())
            .collect();
        exits.sort_unstable();
        exits
    }

    /// Arcs whose exit label is not a compass direction, in declaration
    /// order. These become the room's "mapped exits" / portal listing.
    pub fn non_cardinal_arcs(&self) -> Vec<&Arc> {
        self.arcs
            .iter()
            .filter(|arc| !CARDINAL_DIRS.contains(&arc.exit.as_str()))
            .collect()
    }

    /// Arcs that actually lead somewhere, sorted by numeric destination id.
    /// This is the pathfinder's expansion order.
    pub fn filtered_arcs(&self) -> Vec<&Arc> {
        let mut arcs: Vec<&Arc> = self.arcs.iter().filter(|arc| arc.has_destination()).collect();
        arcs.sort_by_key(|arc| arc.destination_value());
        arcs
    }

    /// First arc leading to the room with the given id.
    pub fn arc_to(&self, id: &str) -> Option<&Arc> {
        self.arcs.iter().find(|arc| arc.destination == id)
    }

    /// True when the room hands the player off to another zone. Transfer
    /// rooms name the target zone file somewhere in their notes.
    pub fn is_transfer(&self) -> bool {
        self.notes.as_ref().is_some_and(|notes| notes.contains(".xml"))
    }

    /// The zone file named in this room's notes, if any ("map2.xml" out of
    /// "to the crossing, map2.xml").
    pub fn transfer_file(&self) -> Option<&str> {
        let notes = self.notes.as_ref()?;
        TRANSFER_FILE.find(notes).map(|m| m.as_str())
    }

    /// The fuzzy match predicate the resolver runs against observed game
    /// text.
    ///
    /// With a non-empty `exits` list the room must agree on all three of
    /// cardinal exit set, exact name, and description; with an empty list
    /// only name and description are checked. `ignore_transfers` excludes
    /// transfer rooms outright, so broad scans don't land on zone borders.
    pub fn matches(&self, name: &str, description: &str, exits: &[String], ignore_transfers: bool) -> bool {
        if ignore_transfers && self.is_transfer() {
            return false;
        }
        if !exits.is_empty() {
            let mut observed: Vec<&str> = exits.iter().map(String::as_str).collect();
            observed.sort_unstable();
            return self.cardinal_exits() == observed
                && self.name == name
                && self.has_matching_description(description);
        }
        self.name == name && self.has_matching_description(description)
    }

    /// True when any stored description variant is a prefix of the observed
    /// description, once quotes and semicolons are stripped from it. Game
    /// streams decorate descriptions past the mapped text, so prefix is the
    /// strongest comparison that holds up.
    pub fn has_matching_description(&self, description: &str) -> bool {
        let stripped = description.replace(['"', ';'], "");
        self.descriptions.iter().any(|stored| stripped.starts_with(stored.as_str()))
    }
}
