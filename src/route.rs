//! Down-sampling of routes to the waypoint limit of the LN3 format.
//!
//! The reducer repeatedly contracts the shortest leg between interior
//! waypoints, dropping the later of its two waypoints, until the interior
//! count reaches the target. The first and last waypoint always survive.

use std::iter;

use geo::Point;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};
use uom::si::f64::Length;
use uom::si::length::kilometer;

use crate::{Route, Waypoint};

pub const MAX_WAYPOINTS: usize = 12;
pub const INTERIOR_TARGET: usize = 10;

const EARTH_RADIUS_KM: f64 = 6373.0;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ReduceLimits {
    /// Routes with at most this many waypoints are left alone.
    pub max_waypoints: usize,
    /// Interior waypoints kept when a route is reduced.
    pub interior_target: usize,
}

impl Default for ReduceLimits {
    fn default() -> Self {
        Self {
            max_waypoints: MAX_WAYPOINTS,
            interior_target: INTERIOR_TARGET,
        }
    }
}

/// Haversine distance on a sphere of radius 6373 km.
///
/// The coordinate values go into the trigonometric functions as they are,
/// without a degree to radian conversion. Reduced routes depend on this, as
/// it decides which leg counts as the shortest.
pub fn haversine(from: Point, to: Point) -> Length {
    let (lat1, lng1) = (from.y(), from.x());
    let (lat2, lng2) = (to.y(), to.x());
    let delta_lat = lat2 - lat1;
    let delta_lng = lng2 - lng1;
    let a = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    Length::new::<kilometer>(EARTH_RADIUS_KM * c)
}

/// Index and length of the shortest leg, the first one on ties.
fn shortest_leg(waypoints: &[&Waypoint]) -> Option<(usize, Length)> {
    waypoints
        .iter()
        .tuple_windows()
        .map(|(from, to)| haversine(from.coordinate, to.coordinate))
        .enumerate()
        .min_by(|(_, a), (_, b)| a.get::<kilometer>().total_cmp(&b.get::<kilometer>()))
}

pub fn reduce_route(route: &Route, limits: &ReduceLimits) -> Route {
    if route.len() <= limits.max_waypoints {
        return route.clone();
    }
    let Some((first, rest)) = route.split_first() else {
        return route.clone();
    };
    let Some((last, interior)) = rest.split_last() else {
        return route.clone();
    };

    let mut interior = interior.iter().collect_vec();
    while interior.len() > limits.interior_target {
        let Some((leg, length)) = shortest_leg(&interior) else {
            break;
        };
        let removed = interior.remove(leg + 1);
        debug!(
            "removing {} after leg {leg} of {:.2} km",
            removed.name,
            length.get::<kilometer>()
        );
    }

    let reduced: Route = iter::once(first)
        .chain(interior)
        .chain(iter::once(last))
        .cloned()
        .collect();
    info!(
        "reduced route from {} to {} waypoints",
        route.len(),
        reduced.len()
    );
    reduced
}

#[cfg(test)]
mod test {
    use geo::point;
    use pretty_assertions_sorted::assert_eq_sorted;
    use uom::si::length::kilometer;

    use crate::{Route, Waypoint};

    use super::{haversine, reduce_route, ReduceLimits};

    fn waypoint(name: &str, lat: f64, lng: f64) -> Waypoint {
        Waypoint {
            name: name.to_string(),
            coordinate: point! { x: lng, y: lat },
            altitude: 1000,
        }
    }

    fn names(route: &Route) -> Vec<&str> {
        route.iter().map(|wpt| wpt.name.as_str()).collect()
    }

    // spread over a small area, with uneven spacing so the legs differ
    fn zigzag(count: usize) -> Route {
        (0..count)
            .map(|i| {
                let i = i as f64;
                waypoint(
                    &format!("WPT{i}"),
                    0.1 + 0.003 * (i * 1.7).sin(),
                    0.1 + 0.002 * i + 0.000_1 * i * i,
                )
            })
            .collect()
    }

    #[test]
    fn test_haversine() {
        let origin = point! { x: 0., y: 0. };
        assert!(haversine(origin, origin).get::<kilometer>().abs() < f64::EPSILON);

        // one unit of latitude is one radian of arc
        let distance = haversine(origin, point! { x: 0., y: 1. }).get::<kilometer>();
        assert!((distance - 6373.0).abs() < 1e-9, "{distance}");

        let there = haversine(point! { x: 0.1, y: 0.2 }, point! { x: 0.15, y: 0.25 });
        let back = haversine(point! { x: 0.15, y: 0.25 }, point! { x: 0.1, y: 0.2 });
        assert!((there - back).get::<kilometer>().abs() < 1e-9);
    }

    #[test]
    fn test_identity_below_threshold() {
        for count in [0, 1, 2, 5, 12] {
            let route = zigzag(count);
            assert_eq_sorted!(reduce_route(&route, &ReduceLimits::default()), route);
        }
    }

    #[test]
    fn test_reduces_to_twelve() {
        for count in [13, 14, 20, 47] {
            let route = zigzag(count);
            let reduced = reduce_route(&route, &ReduceLimits::default());
            assert_eq!(reduced.len(), 12, "{count} waypoints");
            assert_eq!(reduced.first(), route.first());
            assert_eq!(reduced.last(), route.last());
        }
    }

    #[test]
    fn test_keeps_relative_order() {
        let route = zigzag(30);
        let reduced = reduce_route(&route, &ReduceLimits::default());
        let positions: Vec<usize> = reduced
            .iter()
            .map(|wpt| route.iter().position(|orig| orig == wpt).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_removes_later_waypoint_of_shortest_leg() {
        // interior legs 5/64, 3/64, 3/64, 8/64: the first 3/64 leg wins and its
        // second waypoint goes
        let route = Route(vec![
            waypoint("START", 0., -1.),
            waypoint("A", 0., 0.),
            waypoint("B", 0., 5. / 64.),
            waypoint("C", 0., 8. / 64.),
            waypoint("D", 0., 11. / 64.),
            waypoint("E", 0., 19. / 64.),
            waypoint("END", 0., 1.),
        ]);
        let limits = ReduceLimits {
            max_waypoints: 6,
            interior_target: 4,
        };

        let reduced = reduce_route(&route, &limits);

        assert_eq!(names(&reduced), ["START", "A", "B", "D", "E", "END"]);
    }

    #[test]
    fn test_contracts_shortest_legs_first() {
        // clusters of near duplicates collapse before well spaced waypoints
        let mut route = Route(vec![waypoint("DEP", 0., 0.)]);
        for i in 1..=10 {
            let lng = f64::from(i) * 0.01;
            route.push(waypoint(&format!("P{i}"), 0., lng));
            if i % 5 == 0 {
                route.push(waypoint(&format!("P{i}X"), 0., lng + 0.000_01));
            }
        }
        route.push(waypoint("ARR", 0., 0.2));
        assert_eq!(route.len(), 14);

        let reduced = reduce_route(&route, &ReduceLimits::default());

        assert_eq!(
            names(&reduced),
            ["DEP", "P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P9", "P10", "ARR"]
        );
    }
}
