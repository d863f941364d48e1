use super::{load_collection, resolve_settings};
use crate::{InputArgs, OutputFormat, WindowArgs};
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use waze2gpx::MergeMode;
use waze2gpx::exporters::{render_geojson, render_kml};
use waze2gpx::gpxxml::write_gpx;

pub fn convert_command(
    input: &InputArgs,
    window: &WindowArgs,
    merge_mode: MergeMode,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let collection = load_collection(input)?;
    let settings = resolve_settings(&collection, window, merge_mode)?;

    let selected = collection.filter(settings.window);
    log::info!("selected {} of {} trips", selected.len(), collection.len());

    let gpx = write_gpx(selected, settings.merge_mode)?;
    let text = match format {
        OutputFormat::Gpx => gpx,
        OutputFormat::Geojson => render_geojson(&gpx)?,
        OutputFormat::Kml => render_kml(&gpx)?,
    };

    match output {
        Some(path) => fs::write(path, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }

    Ok(())
}
