use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PoiId);
id_newtype!(PeerId);

/// WGS84 position, longitude first to match the routing wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub coordinate: Coordinate,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPeer {
    pub id: PeerId,
    pub name: String,
    pub status: PeerStatus,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAlternative {
    pub geometry: Vec<Coordinate>,
    /// Seconds.
    pub duration: f64,
    /// Meters.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Point(Coordinate),
    WaypointRef {
        index: usize,
        coordinate: Coordinate,
    },
    PointOfInterestRef(PointOfInterest),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Coordinate the contextual actions (add waypoint, add point of interest) act on.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Selection::None => None,
            Selection::Point(coordinate) => Some(*coordinate),
            Selection::WaypointRef { coordinate, .. } => Some(*coordinate),
            Selection::PointOfInterestRef(poi) => Some(poi.coordinate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    #[default]
    Off,
    On,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_serializes_as_tagged_variant() {
        let selection = Selection::WaypointRef {
            index: 2,
            coordinate: Coordinate::new(-122.41, 37.78),
        };
        let value = serde_json::to_value(&selection).expect("serialize");
        assert_eq!(value["type"], "waypoint_ref");
        assert_eq!(value["payload"]["index"], 2);
    }

    #[test]
    fn selection_coordinate_follows_variant() {
        assert_eq!(Selection::None.coordinate(), None);
        let poi = PointOfInterest {
            id: PoiId(4),
            coordinate: Coordinate::new(1.0, 2.0),
            label: "cafe".into(),
        };
        assert_eq!(
            Selection::PointOfInterestRef(poi).coordinate(),
            Some(Coordinate::new(1.0, 2.0))
        );
    }
}
