//! Zone-file loading.
//!
//! Zone maps are XML: a root element carrying the zone id and name, `node`
//! children for rooms (with nested `description`, `position`, and `arc`
//! entries), and root-level `label` captions. Parsing is a single streaming
//! pass over `quick_xml` events; no DOM is built.
//!
//! Full loads are strict about required attributes. Metadata loads
//! (`load_zone_meta`) are deliberately lenient and default missing root
//! attributes to empty strings, so a catalog listing can still show a file
//! that the full loader would reject.

use crate::room::{Arc, Position, Room};
use crate::store::ZoneStore;
use crate::zone::{Label, Zone};
use log::{info, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map file not found or unreadable: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("invalid map format in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },
    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },
}

/// Catalog entry for one zone file: just the root attributes, no rooms.
#[derive(Debug, Clone)]
pub struct ZoneMeta {
    pub id: String,
    pub name: String,
    pub file: String,
}

/// Result of loading a whole maps directory. Files that fail to load are
/// reported here; they never abort the rest of the batch.
#[derive(Debug)]
pub struct DirectoryLoad {
    pub store: ZoneStore,
    pub failures: Vec<MapError>,
}

/// Load a single zone file.
///
/// # Errors
/// `FileNotFound` when the file cannot be read, `Format` when the XML is
/// well formed but structurally wrong (no root element, a room without an
/// id or name, a non-integer position or cost), `Parse` when the XML
/// itself is broken.
pub fn load_zone(path: &Path) -> Result<Zone, MapError> {
    let text = fs::read_to_string(path).map_err(|_| MapError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let zone = parse_zone(&text, path)?;

    let dangling = zone
        .rooms
        .iter()
        .flat_map(|room| room.arcs.iter())
        .filter(|arc| arc.has_destination() && zone.room(&arc.destination).is_none())
        .count();
    if dangling > 0 {
        warn!("zone '{}' ({}): {dangling} arc(s) point at room ids not in the zone", zone.id, zone.file);
    }
    Ok(zone)
}

/// Read only a zone file's root attributes.
///
/// Missing id or name attributes come back as empty strings rather than
/// errors; a catalog should list what it can.
///
/// # Errors
/// `FileNotFound` when the file cannot be read, `Parse` on broken XML,
/// `Format` when there is no root element at all.
pub fn load_zone_meta(path: &Path) -> Result<ZoneMeta, MapError> {
    let text = fs::read_to_string(path).map_err(|_| MapError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_meta(&text, path)
}

/// Catalog every `.xml` file in a directory, in file-name order.
///
/// # Errors
/// Errs only when the directory itself cannot be read; unloadable files
/// are `Err` entries in the returned list.
pub fn load_all_meta(dir: &Path) -> Result<Vec<Result<ZoneMeta, MapError>>, MapError> {
    Ok(catalog(dir)?.iter().map(|path| load_zone_meta(path)).collect())
}

/// Load every `.xml` file in a directory into a fresh store.
///
/// # Errors
/// Errs only when the directory itself cannot be read. Per-file failures
/// land in `DirectoryLoad::failures` and the rest of the batch still loads.
pub fn load_directory(dir: &Path) -> Result<DirectoryLoad, MapError> {
    let mut store = ZoneStore::new();
    let mut failures = Vec::new();
    for path in catalog(dir)? {
        match load_zone(&path) {
            Ok(zone) => {
                info!("loaded zone '{}' ({} rooms) from {}", zone.name, zone.rooms.len(), zone.file);
                store.insert(zone);
            },
            Err(err) => {
                warn!("{err}");
                failures.push(err);
            },
        }
    }
    Ok(DirectoryLoad { store, failures })
}

fn catalog(dir: &Path) -> Result<Vec<PathBuf>, MapError> {
    let entries = fs::read_dir(dir).map_err(|_| MapError::FileNotFound {
        path: dir.to_path_buf(),
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_name_of(path: &Path) -> String {
    path.file_name().map_or_else(String::new, |name| name.to_string_lossy().into_owned())
}

fn format_error(path: &Path, reason: impl Into<String>) -> MapError {
    MapError::Format {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn parse_error(path: &Path, source: impl Into<quick_xml::Error>) -> MapError {
    MapError::Parse {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

/// Descriptions are stored with quotes and semicolons removed; the match
/// predicate strips the observed text the same way.
fn strip_description(text: &str) -> String {
    text.replace(['"', ';'], "")
}

fn attr_map(element: &BytesStart, path: &Path) -> Result<HashMap<String, String>, MapError> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| parse_error(path, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| parse_error(path, e))?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn int_attr(attrs: &mut HashMap<String, String>, key: &str, element: &str, path: &Path) -> Result<i32, MapError> {
    match attrs.remove(key) {
        None => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| format_error(path, format!("{element} attribute '{key}' is not an integer: '{raw}'"))),
    }
}

fn parse_meta(text: &str, path: &Path) -> Result<ZoneMeta, MapError> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event().map_err(|e| parse_error(path, e))? {
            Event::Start(e) | Event::Empty(e) => {
                let mut attrs = attr_map(&e, path)?;
                return Ok(ZoneMeta {
                    id: attrs.remove("id").unwrap_or_default(),
                    name: attrs.remove("name").unwrap_or_default(),
                    file: file_name_of(path),
                });
            },
            Event::Eof => return Err(format_error(path, "missing root element")),
            _ => {},
        }
    }
}

fn parse_zone(text: &str, path: &Path) -> Result<Zone, MapError> {
    let mut reader = Reader::from_str(text);
    let mut parser = ZoneParser::new(file_name_of(path));
    loop {
        match reader.read_event().map_err(|e| parse_error(path, e))? {
            Event::Start(e) => parser.open(&e, path)?,
            Event::Empty(e) => {
                parser.open(&e, path)?;
                parser.close(e.name().as_ref());
            },
            Event::End(e) => parser.close(e.name().as_ref()),
            Event::Text(t) => {
                if parser.in_description && parser.skip_depth == 0 {
                    let piece = t.unescape().map_err(|e| parse_error(path, e))?;
                    parser.text.push_str(&piece);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }
    parser.finish(path)
}

/// Streaming parse state. The first element opened becomes the zone root
/// (its tag name is not checked, only its attributes); `skip_depth` counts
/// how far inside an unrecognized subtree we currently are.
struct ZoneParser {
    file: String,
    zone: Option<Zone>,
    room: Option<Room>,
    label: Option<Label>,
    in_description: bool,
    text: String,
    skip_depth: usize,
}
impl ZoneParser {
    fn new(file: String) -> Self {
        Self {
            file,
            zone: None,
            room: None,
            label: None,
            in_description: false,
            text: String::new(),
            skip_depth: 0,
        }
    }

    fn open(&mut self, element: &BytesStart, path: &Path) -> Result<(), MapError> {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return Ok(());
        }
        if self.in_description {
            self.skip_depth += 1;
            return Ok(());
        }
        if self.zone.is_none() {
            let mut attrs = attr_map(element, path)?;
            let id = attrs
                .remove("id")
                .ok_or_else(|| format_error(path, "root element missing required 'id' attribute"))?;
            let name = attrs
                .remove("name")
                .ok_or_else(|| format_error(path, "root element missing required 'name' attribute"))?;
            self.zone = Some(Zone::new(id, name, self.file.clone()));
            return Ok(());
        }
        if self.room.is_some() {
            return self.open_in_room(element, path);
        }
        if self.label.is_some() {
            if element.name().as_ref() == b"position" {
                let mut attrs = attr_map(element, path)?;
                let position = position_from(&mut attrs, "label position", path)?;
                if let Some(label) = self.label.as_mut() {
                    label.position = position;
                }
            } else {
                self.skip_depth += 1;
            }
            return Ok(());
        }
        match element.name().as_ref() {
            b"node" => {
                let mut attrs = attr_map(element, path)?;
                let id = attrs
                    .remove("id")
                    .ok_or_else(|| format_error(path, "room element missing required 'id' attribute"))?;
                let name = attrs
                    .remove("name")
                    .ok_or_else(|| format_error(path, "room element missing required 'name' attribute"))?;
                self.room = Some(Room {
                    id,
                    name,
                    descriptions: Vec::new(),
                    notes: attrs.remove("note"),
                    color: attrs.remove("color"),
                    position: Position::default(),
                    arcs: Vec::new(),
                });
            },
            b"label" => {
                let mut attrs = attr_map(element, path)?;
                self.label = Some(Label {
                    text: attrs.remove("text").unwrap_or_default(),
                    position: Position::default(),
                });
            },
            _ => self.skip_depth += 1,
        }
        Ok(())
    }

    fn open_in_room(&mut self, element: &BytesStart, path: &Path) -> Result<(), MapError> {
        match element.name().as_ref() {
            b"description" => {
                self.in_description = true;
                self.text.clear();
            },
            b"position" => {
                let mut attrs = attr_map(element, path)?;
                let position = position_from(&mut attrs, "position", path)?;
                if let Some(room) = self.room.as_mut() {
                    room.position = position;
                }
            },
            b"arc" => {
                let mut attrs = attr_map(element, path)?;
                let cost = match attrs.remove("cost") {
                    None => None,
                    Some(raw) => Some(raw.parse().map_err(|_| {
                        format_error(path, format!("arc attribute 'cost' is not an integer: '{raw}'"))
                    })?),
                };
                let arc = Arc {
                    exit: attrs.remove("exit").unwrap_or_default(),
                    command: attrs.remove("move").unwrap_or_default(),
                    destination: attrs.remove("destination").unwrap_or_default(),
                    hidden: attrs.remove("hidden").is_some_and(|v| v.eq_ignore_ascii_case("true")),
                    cost,
                };
                if let Some(room) = self.room.as_mut() {
                    room.arcs.push(arc);
                }
            },
            _ => self.skip_depth += 1,
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        match name {
            b"description" => {
                if self.in_description {
                    self.in_description = false;
                    if let Some(room) = self.room.as_mut() {
                        room.descriptions.push(strip_description(&self.text));
                    }
                    self.text.clear();
                }
            },
            b"node" => {
                if let Some(room) = self.room.take()
                    && let Some(zone) = self.zone.as_mut()
                {
                    if zone.room(&room.id).is_some() {
                        warn!("zone '{}': duplicate room id '{}'; later definition wins lookups", zone.id, room.id);
                    }
                    zone.add_room(room);
                }
            },
            b"label" => {
                if let Some(label) = self.label.take()
                    && let Some(zone) = self.zone.as_mut()
                {
                    zone.labels.push(label);
                }
            },
            _ => {},
        }
    }

    fn finish(self, path: &Path) -> Result<Zone, MapError> {
        self.zone.ok_or_else(|| format_error(path, "missing root element"))
    }
}

fn position_from(attrs: &mut HashMap<String, String>, element: &str, path: &Path) -> Result<Position, MapError> {
    Ok(Position {
        x: int_attr(attrs, "x", element, path)?,
        y: int_attr(attrs, "y", element, path)?,
        z: int_attr(attrs, "z", element, path)?,
    })
}
