use bevy_derive::{Deref, DerefMut};
use geo::Point;
use serde::Serialize;
use tracing::warn;

pub mod convert;
pub mod ln3;
pub mod pln;
pub mod route;

// every byte sequence decodes as win-1252, so this cannot fail
fn read_to_string(contents: &[u8]) -> String {
    String::from_utf8(contents.to_vec()).unwrap_or_else(|_| {
        let (string, _, errors) = encoding_rs::WINDOWS_1252.decode(contents);
        if errors {
            warn!("errors while decoding win-1252");
        }
        string.into_owned()
    })
}

// sign (1.0 for N/E, -1.0 for S/W), degrees, minutes, seconds
type DegMinSec = (f64, f64, f64, f64);

fn dms_to_decimal((sign, deg, min, sec): DegMinSec) -> f64 {
    sign * (deg + min / 60.0 + sec / 3600.0)
}

/// A named point of a flight plan. `coordinate.y()` is the latitude,
/// `coordinate.x()` the longitude, both in decimal degrees.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub coordinate: Point,
    pub altitude: i32,
}

/// Waypoints in flight order.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Deref, DerefMut)]
pub struct Route(pub Vec<Waypoint>);

impl FromIterator<Waypoint> for Route {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
