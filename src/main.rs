#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Waymark **
//! Zone-map console for MUD automapping

use waymark::settings::load_settings;
use waymark::style::ConsoleStyle;
use waymark::{WAYMARK_VERSION, ZoneStore, load_directory, run_console};

use anyhow::{Context, Result};
use colored::Colorize;

use log::info;

use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading map settings...");
    let settings = load_settings();

    println!("{}", format!("WAYMARK {WAYMARK_VERSION}").bright_yellow().underline());
    println!("{}", format!("maps: {}", settings.maps_dir.display()).dim_style());

    let started = Instant::now();
    let mut store = ZoneStore::default();
    match load_directory(&settings.maps_dir) {
        Ok(loaded) => {
            for failure in &loaded.failures {
                println!("{}", failure.to_string().error_style());
            }
            let elapsed = started.elapsed().as_millis();
            println!("{}", format!("{} maps loaded in {elapsed} ms.", loaded.store.len()).dim_style());
            store = loaded.store;
        },
        Err(err) => {
            println!("{}", format!("{err}").error_style());
            println!("{}", "Starting with no maps. Fix the maps directory and 'reload'.".dim_style());
        },
    }
    info!("Map store ready; starting the console.");

    run_console(&mut store, &settings).context("while running the mapper console")
}
