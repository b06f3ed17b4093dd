#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const WAYMARK_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod automap;
pub mod console;
pub mod loader;
pub mod pathfinder;
pub mod resolver;
pub mod room;
pub mod settings;
pub mod store;
pub mod style;
pub mod zone;

// Re-exports for convenience
pub use automap::Host;
pub use console::run_console;
pub use loader::{load_directory, load_zone};
pub use pathfinder::{find_path, find_room_path};
pub use resolver::{Observation, Resolution, resolve};
pub use room::{Arc, Position, Room};
pub use store::ZoneStore;
pub use zone::Zone;
