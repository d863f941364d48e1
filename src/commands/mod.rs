pub mod convert;
pub mod export;
pub mod jump;
pub mod list;

use crate::{InputArgs, WindowArgs};
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use waze2gpx::{ExportSettings, MergeMode, TimeWindow, TripCollection, parse_timestamp};

/// Reads every export named on the command line, or stdin when none are.
pub fn load_collection(input: &InputArgs) -> Result<TripCollection, Box<dyn Error>> {
    let texts = if input.files.is_empty() {
        let mut text = String::new();
        io::stdin().lock().read_to_string(&mut text)?;
        vec![text]
    } else {
        input
            .files
            .iter()
            .map(|path| {
                log::debug!("reading {}", path.display());
                fs::read_to_string(path)
                    .map_err(|e| format!("failed to read {}: {e}", path.display()))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let collection = TripCollection::from_exports(texts.iter().map(String::as_str))?;
    if collection.is_empty() {
        return Err("Failed to load any trips!".into());
    }

    log::info!("loaded {} trips", collection.len());
    Ok(collection)
}

/// Resolves `--start`/`--end` against the collection span.
pub fn resolve_window(
    collection: &TripCollection,
    window: &WindowArgs,
) -> Result<TimeWindow, Box<dyn Error>> {
    let span = collection.span().ok_or("Failed to load any trips!")?;

    let start = match &window.start {
        Some(raw) => parse_timestamp(raw)?,
        None => span.start,
    };
    let end = match &window.end {
        Some(raw) => parse_timestamp(raw)?,
        None => span.end,
    };

    Ok(TimeWindow::new(start, end)?)
}

pub fn resolve_settings(
    collection: &TripCollection,
    window: &WindowArgs,
    merge_mode: MergeMode,
) -> Result<ExportSettings, Box<dyn Error>> {
    Ok(ExportSettings {
        window: resolve_window(collection, window)?,
        merge_mode,
    })
}
