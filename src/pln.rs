//! Reader for MSFS `.pln` flight plans.
//!
//! Only two kinds of lines matter: `<ATCWaypoint id="...">` opening a waypoint,
//! and `<WorldPosition>lat,lon,alt</WorldPosition>` carrying its position. Every
//! other line is ignored.

use std::num::ParseIntError;

use geo::point;
use once_cell::sync::Lazy;
use pest::{iterators::Pair, Parser};
use pest_derive::Parser;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{dms_to_decimal, read_to_string, DegMinSec, Route, Waypoint};

#[derive(Parser)]
#[grammar = "pest/pln.pest"]
pub struct PlnParser;

#[derive(Error, Debug)]
pub enum PlnError {
    #[error("failed to parse position: {0}")]
    Parse(#[from] pest::error::Error<Rule>),
    #[error("altitude out of range: {0}")]
    Altitude(#[from] ParseIntError),
    #[error("line {line}: {source}")]
    MalformedLine {
        line: usize,
        #[source]
        source: Box<PlnError>,
    },
    #[error("line {line}: position without a preceding waypoint id")]
    PositionWithoutName { line: usize },
}

pub type PlnResult = Result<Route, PlnError>;

const WAYPOINT_MARKER: &str = "<ATCWaypoint id=";
const POSITION_MARKER: &str = "<WorldPosition>";

// first to last quote, like the id attribute is written
static WAYPOINT_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*)""#).unwrap());
// first '>' to last '<'
static WORLD_POSITION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^>]*>(.*)<").unwrap());

fn parse_dms(pair: Pair<Rule>) -> DegMinSec {
    let mut dms = pair.into_inner();
    let sign = match dms.next().unwrap().as_str() {
        "N" | "E" => 1.0,
        "S" | "W" => -1.0,
        hemisphere => unreachable!("{hemisphere}"),
    };
    let deg = dms.next().unwrap().as_str().parse().unwrap();
    let min = dms.next().unwrap().as_str().parse().unwrap();
    let sec = dms.next().unwrap().as_str().parse().unwrap();

    (sign, deg, min, sec)
}

fn parse_altitude(pair: Pair<Rule>) -> Result<i32, ParseIntError> {
    pair.into_inner().next().unwrap().as_str().parse()
}

/// Converts a coordinate like `N52° 8' 32.00"` into signed decimal degrees.
pub fn degree_to_decimal(coordinate: &str) -> Result<f64, PlnError> {
    let pair = PlnParser::parse(Rule::coordinate, coordinate)?.next().unwrap();
    Ok(dms_to_decimal(parse_dms(pair.into_inner().next().unwrap())))
}

/// Strips the fractional part of an altitude like `+001200.50`.
pub fn convert_altitude(altitude: &str) -> Result<i32, PlnError> {
    let pair = PlnParser::parse(Rule::altitude_field, altitude)?
        .next()
        .unwrap();
    Ok(parse_altitude(pair.into_inner().next().unwrap())?)
}

fn parse_position(payload: &str) -> Result<(f64, f64, i32), PlnError> {
    let mut position = PlnParser::parse(Rule::position, payload)?
        .next()
        .unwrap()
        .into_inner();
    let lat = dms_to_decimal(parse_dms(position.next().unwrap()));
    let lng = dms_to_decimal(parse_dms(position.next().unwrap()));
    let altitude = parse_altitude(position.next().unwrap())?;

    Ok((lat, lng, altitude))
}

/// Line scanner state: the id of the waypoint whose position comes next.
#[derive(Debug, Default)]
struct PlnReader {
    pending_name: Option<String>,
    waypoints: Vec<Waypoint>,
}

impl PlnReader {
    fn read_line(&mut self, number: usize, line: &str) -> Result<(), PlnError> {
        if line.contains(WAYPOINT_MARKER) {
            let name = WAYPOINT_ID_RE
                .captures(line)
                .and_then(|captures| captures.get(1))
                .map_or("", |name| name.as_str());
            if let Some(previous) = self.pending_name.replace(name.to_string()) {
                warn!("line {number}: waypoint {previous} has no position, skipping");
            }
        } else if line.contains(POSITION_MARKER) {
            let name = self
                .pending_name
                .take()
                .ok_or(PlnError::PositionWithoutName { line: number })?;
            let payload = WORLD_POSITION_RE
                .captures(line)
                .and_then(|captures| captures.get(1))
                .map_or("", |payload| payload.as_str());
            let (lat, lng, altitude) =
                parse_position(payload).map_err(|e| PlnError::MalformedLine {
                    line: number,
                    source: Box::new(e),
                })?;
            trace!("{name}: {lat}, {lng}, {altitude}");
            self.waypoints.push(Waypoint {
                name,
                coordinate: point! { x: lng, y: lat },
                altitude,
            });
        }

        Ok(())
    }

    fn finish(self) -> Route {
        if let Some(name) = self.pending_name {
            warn!("waypoint {name} has no position, skipping");
        }
        Route(self.waypoints)
    }
}

pub fn parse_pln(content: &[u8]) -> PlnResult {
    let unparsed_file = read_to_string(content);
    let mut reader = PlnReader::default();
    for (index, line) in unparsed_file.lines().enumerate() {
        reader.read_line(index + 1, line)?;
    }
    let route = reader.finish();
    debug!("parsed {} waypoints", route.len());

    Ok(route)
}
