//! Interactive console for inspecting and driving the mapper.
//!
//! The console plays the part of the game client: it owns the variable
//! store the mapper publishes into, feeds observations to the resolver,
//! and prints the command lines a real client would dispatch.

mod input;

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Result;

use crate::automap::{self, Host};
use crate::loader;
use crate::pathfinder;
use crate::resolver::Observation;
use crate::room::Room;
use crate::settings::Settings;
use crate::store::ZoneStore;
use crate::style::ConsoleStyle;
use crate::zone::Zone;
use input::{InputEvent, InputManager};

/// Console commands, parsed from a line of user input.
#[derive(Debug)]
pub enum Command {
    Help,
    Reload,
    Zones,
    Zone(String),
    Port(String),
    Look,
    Room(String),
    Find(String),
    Goto(String),
    Path { start: String, target: String },
    Locate(String),
    Vars,
    Quit,
    Unknown,
}

/// Signal returned by command handlers to the console loop.
enum ConsoleControl {
    Continue,
    Quit,
}

/// Parse a raw input line into a [`Command`].
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    // `locate` keeps its raw remainder: descriptions are matched by
    // prefix, so internal spacing must survive parsing.
    if let Some(rest) = trimmed.strip_prefix("locate ") {
        let rest = rest.trim();
        if !rest.is_empty() {
            return Command::Locate(rest.to_string());
        }
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    match words.as_slice() {
        ["help" | "?"] => Command::Help,
        ["reload"] => Command::Reload,
        ["zones" | "maps"] => Command::Zones,
        ["zone" | "map", id] => Command::Zone((*id).to_string()),
        ["port", id] => Command::Port((*id).to_string()),
        ["look" | "l"] => Command::Look,
        ["room", id] => Command::Room((*id).to_string()),
        ["find", rest @ ..] if !rest.is_empty() => Command::Find(rest.join(" ")),
        ["goto", rest @ ..] if !rest.is_empty() => Command::Goto(rest.join(" ")),
        ["path", start, target] => Command::Path {
            start: (*start).to_string(),
            target: (*target).to_string(),
        },
        ["vars"] => Command::Vars,
        ["quit" | "exit"] => Command::Quit,
        _ => Command::Unknown,
    }
}

/// Host backed by stdout and an in-memory variable map.
///
/// `send` prints the dispatched command line instead of forwarding it to
/// a game connection.
#[derive(Debug, Default)]
pub struct ConsoleHost {
    vars: BTreeMap<String, String>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vars(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }
}

impl Host for ConsoleHost {
    fn send(&mut self, text: &str) {
        println!("{} {}", "send:".dim_style(), text);
    }

    fn get(&self, variable: &str) -> String {
        self.vars.get(variable).cloned().unwrap_or_default()
    }

    fn set(&mut self, variable: &str, value: &str) {
        self.vars.insert(variable.to_string(), value.to_string());
    }
}

/// Run the interactive console until the user quits.
///
/// # Errors
/// Returns an error if console input fails in a way the fallback stdin
/// backend cannot recover from.
pub fn run_console(store: &mut ZoneStore, settings: &Settings) -> Result<()> {
    let mut host = ConsoleHost::new();
    let mut input = InputManager::new();

    println!("{}", "Type 'help' for commands.".dim_style());

    loop {
        let prompt = prompt_for(store, &host);
        let event = input.read_line(&prompt)?;
        let line = match event {
            InputEvent::Line(line) => line,
            InputEvent::Eof => "quit".to_string(),
            InputEvent::Interrupted => {
                println!("{}", "Canceled.".dim_style());
                continue;
            },
        };

        if line.trim().is_empty() {
            continue;
        }

        match dispatch(store, &mut host, settings, &line) {
            ConsoleControl::Continue => {},
            ConsoleControl::Quit => break,
        }
    }

    Ok(())
}

fn prompt_for(store: &ZoneStore, host: &ConsoleHost) -> String {
    let zone = store.current_zone().map_or("no map", |zone| zone.name.as_str());
    let room = host.get("roomid");
    let room = if room.is_empty() { "?".to_string() } else { room };
    format!("\n[{zone}|{room}]>> ")
}

fn dispatch(store: &mut ZoneStore, host: &mut ConsoleHost, settings: &Settings, line: &str) -> ConsoleControl {
    match parse_command(line) {
        Command::Help => help_handler(),
        Command::Reload => reload_handler(store, settings),
        Command::Zones => zones_handler(store),
        Command::Zone(id) => zone_handler(store, host, &id),
        Command::Port(id) => port_handler(store, host, &id),
        Command::Look => look_handler(store, host),
        Command::Room(id) => room_handler(store, &id),
        Command::Find(fragment) => find_handler(store, &fragment),
        Command::Goto(target) => goto_handler(store, host, &target),
        Command::Path { start, target } => path_handler(store, &start, &target),
        Command::Locate(raw) => locate_handler(store, host, &raw),
        Command::Vars => vars_handler(host),
        Command::Unknown => {
            println!("{}", "Unrecognized command. Type 'help' for the list.".error_style());
            ConsoleControl::Continue
        },
        Command::Quit => ConsoleControl::Quit,
    }
}

fn help_handler() -> ConsoleControl {
    println!("{}", "Mapper console commands".heading_style());
    let entries = [
        ("help, ?", "show this list"),
        ("reload", "reload all map files from disk"),
        ("zones", "list loaded maps"),
        ("zone <id>", "switch the current map"),
        ("port <id>", "jump to a room in the current map"),
        ("look, l", "show the room the mapper thinks you are in"),
        ("room <id>", "show a room card without moving"),
        ("find <fragment>", "list rooms in the current map whose notes match"),
        ("goto <note|id>", "print the moves from here to a noted room or id"),
        ("path <start> <target>", "show the route between two room ids"),
        ("locate <name> | <desc> [| exits]", "resolve an observed room"),
        ("vars", "dump the published mapper variables"),
        ("quit, exit", "leave the console"),
    ];
    for (verb, what) in entries {
        println!("  {}{}", format!("{verb:<34}").exit_style(), what);
    }
    ConsoleControl::Continue
}

fn reload_handler(store: &mut ZoneStore, settings: &Settings) -> ConsoleControl {
    let started = Instant::now();
    match loader::load_directory(&settings.maps_dir) {
        Ok(loaded) => {
            for failure in &loaded.failures {
                println!("{}", failure.to_string().error_style());
            }
            let count = loaded.store.len();
            store.replace(loaded.store);
            let elapsed = started.elapsed().as_millis();
            println!("{}", format!("{count} maps loaded in {elapsed} ms.").dim_style());
        },
        Err(err) => {
            println!("{}", format!("{err:#}").error_style());
        },
    }
    ConsoleControl::Continue
}

fn zones_handler(store: &ZoneStore) -> ConsoleControl {
    if store.is_empty() {
        println!("{}", "No maps loaded.".dim_style());
        return ConsoleControl::Continue;
    }
    println!("{}", "Loaded maps".heading_style());
    for zone in store.iter() {
        let marker = if store.current_zone_id() == Some(zone.id.as_str()) { "*" } else { " " };
        println!(
            "{} {} {} ({} rooms, {})",
            marker,
            zone.id.dim_style(),
            zone.name.zone_style(),
            zone.rooms.len(),
            zone.file.dim_style(),
        );
    }
    ConsoleControl::Continue
}

fn zone_handler(store: &mut ZoneStore, host: &mut ConsoleHost, id: &str) -> ConsoleControl {
    if store.get(id).is_none() {
        println!("{}", format!("No map with id '{id}'.").error_style());
        return ConsoleControl::Continue;
    }
    store.set_current(id);
    if let Some(zone) = store.current_zone() {
        automap::publish_zone(host, zone);
        println!("Current map is now {} ({}).", zone.name.zone_style(), zone.file.dim_style());
    }
    ConsoleControl::Continue
}

fn port_handler(store: &ZoneStore, host: &mut ConsoleHost, id: &str) -> ConsoleControl {
    let Some(zone) = store.current_zone() else {
        println!("{}", "No current map. Use 'zone <id>' first.".error_style());
        return ConsoleControl::Continue;
    };
    let Some(room) = zone.room(id) else {
        println!("{}", format!("No room '{id}' in {}.", zone.name).error_style());
        return ConsoleControl::Continue;
    };
    automap::publish_room(host, room);
    show_room(zone, room);
    ConsoleControl::Continue
}

fn look_handler(store: &ZoneStore, host: &ConsoleHost) -> ConsoleControl {
    let Some(zone) = store.current_zone() else {
        println!("{}", "No current map. Use 'zone <id>' first.".error_style());
        return ConsoleControl::Continue;
    };
    let id = host.get("roomid");
    let Some(room) = zone.room(&id) else {
        println!("{}", "Position unknown. Use 'port <id>' or 'locate' first.".error_style());
        return ConsoleControl::Continue;
    };
    show_room(zone, room);
    ConsoleControl::Continue
}

fn room_handler(store: &ZoneStore, id: &str) -> ConsoleControl {
    let Some(zone) = store.current_zone() else {
        println!("{}", "No current map. Use 'zone <id>' first.".error_style());
        return ConsoleControl::Continue;
    };
    match zone.room(id) {
        Some(room) => show_room(zone, room),
        None => println!("{}", format!("No room '{id}' in {}.", zone.name).error_style()),
    }
    ConsoleControl::Continue
}

fn find_handler(store: &ZoneStore, fragment: &str) -> ConsoleControl {
    let Some(zone) = store.current_zone() else {
        println!("{}", "No current map. Use 'zone <id>' first.".error_style());
        return ConsoleControl::Continue;
    };
    let rooms = zone.rooms_with_note(fragment);
    if rooms.is_empty() {
        println!("{}", format!("No rooms noted '{fragment}' in {}.", zone.name).dim_style());
        return ConsoleControl::Continue;
    }
    for room in rooms {
        let notes = room.notes.clone().unwrap_or_default();
        println!("{} {} {}", room.id.dim_style(), room.name.room_style(), notes.note_style());
    }
    ConsoleControl::Continue
}

fn goto_handler(store: &ZoneStore, host: &mut ConsoleHost, target: &str) -> ConsoleControl {
    let Some(zone) = store.current_zone() else {
        println!("{}", "No current map. Use 'zone <id>' first.".error_style());
        return ConsoleControl::Continue;
    };
    let Some(room) = goto_target(zone, target) else {
        println!("{}", format!("Nothing noted or numbered '{target}' in {}.", zone.name).error_style());
        return ConsoleControl::Continue;
    };
    let start = host.get("roomid");
    if start.is_empty() {
        println!("{}", "Position unknown. Use 'port <id>' or 'locate' first.".error_style());
        return ConsoleControl::Continue;
    }
    if start == room.id {
        println!("{}", "Already there.".dim_style());
        return ConsoleControl::Continue;
    }

    let rooms = pathfinder::find_room_path(zone, &start, &room.id);
    if rooms.is_empty() {
        println!("{}", format!("No route from {start} to {} ({}).", room.id, room.name).error_style());
        return ConsoleControl::Continue;
    }
    match pathfinder::moves_for_path(zone, &rooms) {
        Ok(moves) => {
            println!("{} {}", "route:".dim_style(), rooms.join(" > ").dim_style());
            host.send(&quoted(&moves));
        },
        Err(err) => {
            println!("{}", format!("{err:#}").error_style());
        },
    }
    ConsoleControl::Continue
}

fn path_handler(store: &ZoneStore, start: &str, target: &str) -> ConsoleControl {
    let Some(zone) = store.current_zone() else {
        println!("{}", "No current map. Use 'zone <id>' first.".error_style());
        return ConsoleControl::Continue;
    };
    let rooms = pathfinder::find_room_path(zone, start, target);
    if rooms.is_empty() {
        println!("{}", format!("No route from {start} to {target}.").dim_style());
        return ConsoleControl::Continue;
    }
    println!("{} {}", "rooms:".dim_style(), rooms.join(" > "));
    match pathfinder::moves_for_path(zone, &rooms) {
        Ok(moves) => println!("{} {}", "moves:".dim_style(), quoted(&moves).exit_style()),
        Err(err) => println!("{}", format!("{err:#}").error_style()),
    }
    ConsoleControl::Continue
}

fn locate_handler(store: &mut ZoneStore, host: &mut ConsoleHost, raw: &str) -> ConsoleControl {
    let observation = parse_observation(raw);
    if observation.name.is_empty() {
        println!("{}", "Usage: locate <name> | <description> [| exits]".error_style());
        return ConsoleControl::Continue;
    }
    match automap::observe(store, host, &observation) {
        Some(resolution) => {
            println!(
                "Resolved to room {} in map {}.",
                resolution.room_id.room_style(),
                resolution.zone_id.zone_style(),
            );
            if let Some(zone) = store.get(&resolution.zone_id)
                && let Some(room) = zone.room(&resolution.room_id)
            {
                show_room(zone, room);
            }
        },
        None => println!("{}", "No matching room.".dim_style()),
    }
    ConsoleControl::Continue
}

fn vars_handler(host: &ConsoleHost) -> ConsoleControl {
    let mut empty = true;
    for (name, value) in host.vars() {
        println!("{} = {value}", name.exit_style());
        empty = false;
    }
    if empty {
        println!("{}", "No variables published yet.".dim_style());
    }
    ConsoleControl::Continue
}

/// Pick the room a `goto` argument names: the last note match wins,
/// otherwise the argument is tried as a room id.
fn goto_target<'a>(zone: &'a Zone, target: &str) -> Option<&'a Room> {
    zone.rooms_with_note(target).last().copied().or_else(|| zone.room(target))
}

/// Join moves into one dispatch line, quoting any move that contains
/// spaces so multi-word commands survive downstream splitting.
fn quoted(moves: &[String]) -> String {
    moves
        .iter()
        .map(|step| {
            if step.contains(' ') {
                format!("\"{step}\"")
            } else {
                step.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a raw `locate` argument on `|` into an [`Observation`]. Exits
/// may be separated by commas or whitespace.
fn parse_observation(raw: &str) -> Observation {
    let mut parts = raw.splitn(3, '|');
    let name = parts.next().unwrap_or_default().trim().to_string();
    let description = parts.next().unwrap_or_default().trim().to_string();
    let exits = parts
        .next()
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|exit| !exit.is_empty())
        .map(str::to_string)
        .collect();
    Observation { name, description, exits }
}

fn show_room(zone: &Zone, room: &Room) {
    println!();
    println!("{} {}", room.name.room_style(), format!("[{}:{}]", zone.id, room.id).dim_style());
    let width = textwrap::termwidth().min(100);
    for description in &room.descriptions {
        println!("{}", textwrap::fill(description, width).description_style());
    }
    if let Some(notes) = &room.notes {
        println!("{} {}", "note:".dim_style(), notes.note_style());
    }
    if let Some(color) = &room.color {
        println!("{} {}", "color:".dim_style(), color);
    }
    for arc in &room.arcs {
        let hidden = if arc.hidden { " (hidden)" } else { "" };
        println!(
            "  {} {} {}{}",
            arc.exit.exit_style(),
            "->".dim_style(),
            arc.destination.dim_style(),
            hidden.dim_style(),
        );
    }
    if let Some(line) = automap::mapped_exits_line(room) {
        println!("{}", line.exit_style());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Position;

    fn room(id: &str, note: Option<&str>) -> Room {
        Room {
            id: id.to_string(),
            name: format!("Room {id}"),
            descriptions: vec![],
            notes: note.map(str::to_string),
            color: None,
            position: Position::default(),
            arcs: vec![],
        }
    }

    #[test]
    fn parses_core_commands() {
        assert!(matches!(parse_command("help"), Command::Help));
        assert!(matches!(parse_command("?"), Command::Help));
        assert!(matches!(parse_command("  zones "), Command::Zones));
        assert!(matches!(parse_command("reload"), Command::Reload));
        assert!(matches!(parse_command("quit"), Command::Quit));
        assert!(matches!(parse_command("exit"), Command::Quit));
        assert!(matches!(parse_command("vars"), Command::Vars));
        assert!(matches!(parse_command("look"), Command::Look));
        assert!(matches!(parse_command("l"), Command::Look));
    }

    #[test]
    fn parses_arguments_into_commands() {
        assert!(matches!(parse_command("zone 3"), Command::Zone(id) if id == "3"));
        assert!(matches!(parse_command("map 3"), Command::Zone(id) if id == "3"));
        assert!(matches!(parse_command("port 120"), Command::Port(id) if id == "120"));
        assert!(matches!(parse_command("room 42"), Command::Room(id) if id == "42"));
        assert!(matches!(
            parse_command("path 1 99"),
            Command::Path { start, target } if start == "1" && target == "99"
        ));
    }

    #[test]
    fn find_and_goto_join_their_arguments() {
        assert!(matches!(parse_command("find north gate"), Command::Find(f) if f == "north gate"));
        assert!(matches!(parse_command("goto teller window"), Command::Goto(t) if t == "teller window"));
    }

    #[test]
    fn locate_keeps_the_raw_remainder() {
        let cmd = parse_command("locate Town Square | The square bustles.  A fountain | north, south");
        assert!(matches!(cmd, Command::Locate(raw) if raw.contains("bustles.  A fountain")));
    }

    #[test]
    fn bare_or_unknown_input_is_unknown() {
        assert!(matches!(parse_command(""), Command::Unknown));
        assert!(matches!(parse_command("locate"), Command::Unknown));
        assert!(matches!(parse_command("frobnicate all"), Command::Unknown));
    }

    #[test]
    fn observation_parses_pipes_and_exit_separators() {
        let obs = parse_observation("Town Square | The square bustles. | north,south  east");
        assert_eq!(obs.name, "Town Square");
        assert_eq!(obs.description, "The square bustles.");
        assert_eq!(obs.exits, vec!["north", "south", "east"]);
    }

    #[test]
    fn observation_without_pipes_is_name_only() {
        let obs = parse_observation("Town Square");
        assert_eq!(obs.name, "Town Square");
        assert!(obs.description.is_empty());
        assert!(obs.exits.is_empty());
    }

    #[test]
    fn goto_prefers_the_last_note_match_over_an_id() {
        let mut zone = Zone::new("1", "Test", "map1.xml");
        zone.add_room(room("bank", None));
        zone.add_room(room("10", Some("bank|atm")));
        zone.add_room(room("11", Some("bank teller")));
        zone.add_room(room("12", None));

        let hit = goto_target(&zone, "bank").unwrap();
        assert_eq!(hit.id, "11");

        let by_id = goto_target(&zone, "12").unwrap();
        assert_eq!(by_id.id, "12");

        assert!(goto_target(&zone, "vault").is_none());
    }

    #[test]
    fn quoting_wraps_multiword_moves() {
        let moves = vec!["n".to_string(), "climb ladder".to_string(), "e".to_string()];
        assert_eq!(quoted(&moves), "n \"climb ladder\" e");
    }
}
