use super::{load_collection, resolve_settings};
use crate::{InputArgs, OutputFormat, WindowArgs};
use std::error::Error;
use std::fs;
use std::path::Path;
use waze2gpx::timestamp::format_date;
use waze2gpx::{MergeMode, Trip, render_all};

pub fn export_command(
    input: &InputArgs,
    window: &WindowArgs,
    merge_mode: MergeMode,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let collection = load_collection(input)?;
    let settings = resolve_settings(&collection, window, merge_mode)?;
    let selected = collection.filter(settings.window);

    let (Some(first), Some(last)) = (selected.first(), selected.last()) else {
        log::warn!("no trips in the selected window, nothing written");
        return Ok(());
    };

    let rendered = render_all(selected, settings.merge_mode)?;

    fs::create_dir_all(output_dir)?;
    for (format, contents) in [
        (OutputFormat::Gpx, &rendered.gpx),
        (OutputFormat::Geojson, &rendered.geojson),
        (OutputFormat::Kml, &rendered.kml),
    ] {
        let path = output_dir.join(file_name(first, last, format)?);
        fs::write(&path, contents)?;
        println!("{}", path.display());
    }

    Ok(())
}

/// `waze_history_<first>_<last>.<ext>`, dated by the first and last selected trip.
fn file_name(first: &Trip, last: &Trip, format: OutputFormat) -> Result<String, Box<dyn Error>> {
    Ok(format!(
        "waze_history_{}_{}.{}",
        format_date(first.start_time)?,
        format_date(last.start_time)?,
        format.extension()
    ))
}
