//! Station locations and walking estimates.
//!
//! Stations are indexed in an R-tree over (lon, lat) degrees. Queries filter
//! the tree with a conservative degree radius first, then apply the haversine
//! distance to the candidates.

use geo::{HaversineDistance, Point};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::domain::{LatLong, Station, StationId};

const METERS_PER_MILE: f64 = 1609.344;
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Great-circle distance in meters.
pub fn distance_meters(from: LatLong, to: LatLong) -> f64 {
    point(from).haversine_distance(&point(to))
}

/// Minutes to walk between two positions, rounded up.
pub fn walking_mins(from: LatLong, to: LatLong, walking_mph: f64) -> u32 {
    let miles = distance_meters(from, to) / METERS_PER_MILE;
    let hours = miles / walking_mph;
    (hours * 60.0).ceil() as u32
}

fn point(position: LatLong) -> Point {
    Point::new(position.lon, position.lat)
}

#[derive(Debug, Clone)]
struct StationNode {
    station: StationId,
    position: LatLong,
    point: [f64; 2],
}

impl RTreeObject for StationNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// A station found near a position.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub station: StationId,
    pub position: LatLong,
    pub distance_m: f64,
}

/// Spatial index of station positions.
#[derive(Debug)]
pub struct StationLocations {
    tree: RTree<StationNode>,
}

impl StationLocations {
    pub fn new<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Self {
        let nodes = stations
            .into_iter()
            .map(|s| StationNode {
                station: s.id.clone(),
                position: s.position,
                point: [s.position.lon, s.position.lat],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Up to `max` stations within `range_km` of `position`, nearest first.
    pub fn nearest_within(&self, position: LatLong, range_km: f64, max: usize) -> Vec<NearbyStation> {
        let range_m = range_km * 1000.0;
        if range_m <= 0.0 || !range_m.is_finite() || max == 0 {
            return Vec::new();
        }

        // Longitude degrees shrink towards the poles, so size the box by them.
        let shrink = position.lat.to_radians().cos().max(0.01);
        let radius_deg = range_m / (METERS_PER_DEGREE * shrink);

        let mut found: Vec<NearbyStation> = self
            .tree
            .locate_within_distance([position.lon, position.lat], radius_deg * radius_deg)
            .filter_map(|node| {
                let distance_m = distance_meters(position, node.position);
                (distance_m <= range_m).then(|| NearbyStation {
                    station: node.station.clone(),
                    position: node.position,
                    distance_m,
                })
            })
            .collect();

        found.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.station.cmp(&b.station))
        });
        found.truncate(max);
        found
    }
}
