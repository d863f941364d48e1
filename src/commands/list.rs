use super::{load_collection, resolve_window};
use crate::{InputArgs, WindowArgs};
use std::error::Error;
use waze2gpx::timestamp::format_instant;

pub fn list_command(input: &InputArgs, window: &WindowArgs) -> Result<(), Box<dyn Error>> {
    let collection = load_collection(input)?;
    let window = resolve_window(&collection, window)?;
    let selected = collection.filter(window);

    println!("Parsed trips: {}", collection.len());
    println!("Selected trips: {}", selected.len());

    for trip in selected {
        println!(
            "{}\t{}\t{} points",
            format_instant(trip.start_time)?,
            format_instant(trip.end_time())?,
            trip.points.len()
        );
    }

    Ok(())
}
