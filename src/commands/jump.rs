use super::load_collection;
use crate::{Direction, InputArgs};
use std::error::Error;
use waze2gpx::parse_timestamp;
use waze2gpx::timestamp::format_instant;

pub fn jump_command(input: &InputArgs, from: &str, direction: Direction) -> Result<(), Box<dyn Error>> {
    let collection = load_collection(input)?;
    let from = parse_timestamp(from)?;

    let (found, description) = match direction {
        Direction::Next => (collection.next_after(from), "next trip after"),
        Direction::Prev => (collection.prev_before(from), "previous trip before"),
    };

    let trip = found.ok_or_else(|| format!("no {description} {from}"))?;
    println!("{}", format_instant(trip.start_time)?);

    Ok(())
}
