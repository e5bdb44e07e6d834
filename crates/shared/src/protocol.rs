use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        Coordinate, DrawingMode, PoiId, PointOfInterest, RouteAlternative, Selection, TrackedPeer,
    },
    error::ApiError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// `id` is the waypoint's position in the sequence.
    Waypoint,
    /// `id` is the point of interest's identity.
    PointOfInterest,
}

/// Input accepted from the rendering/UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionCommand {
    SurfaceClick {
        lng: f64,
        lat: f64,
    },
    MarkerClick {
        kind: MarkerKind,
        id: u64,
    },
    LocateResult {
        lng: f64,
        lat: f64,
    },
    LocateError {
        code: i32,
    },
    AddPointOfInterest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    RemovePointOfInterest {
        poi: PoiId,
    },
    AddWaypoint,
    DeleteWaypoint {
        index: usize,
    },
    SelectRoute {
        index: usize,
    },
    ToggleDrawing,
    ClearWaypoints,
    ClearDrawnArea,
    RouteFromLocationTo {
        poi: PoiId,
    },
    CloseSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Non-blocking notice; geolocation failed or was denied.
    LocationUnavailable { code: i32 },
    /// The current waypoints produced no route (failure or empty result).
    NoRouteAvailable,
    RouteApplied { generation: u64, alternatives: usize },
    Error(ApiError),
}

/// Read model handed to the renderer after every processed input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub points_of_interest: Vec<PointOfInterest>,
    pub waypoints: Vec<Coordinate>,
    pub peers: Vec<TrackedPeer>,
    pub routes: Vec<RouteAlternative>,
    pub active_route: usize,
    /// Route indices in paint order; the active route is last.
    pub route_display_order: Vec<usize>,
    pub is_loading_route: bool,
    pub selection: Selection,
    pub drawn_area: Vec<Coordinate>,
    pub drawing_mode: DrawingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub routes: Vec<RoutingRoute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRoute {
    pub geometry: RoutingGeometry,
    pub duration: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl From<RoutingRoute> for RouteAlternative {
    fn from(value: RoutingRoute) -> Self {
        Self {
            geometry: value
                .geometry
                .coordinates
                .into_iter()
                .map(Coordinate::from)
                .collect(),
            duration: value.duration,
            distance: value.distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_round_trip_through_tagged_json() {
        let raw = r#"{"type":"marker_click","payload":{"kind":"point_of_interest","id":3}}"#;
        let command: SessionCommand = serde_json::from_str(raw).expect("parse");
        assert_eq!(
            command,
            SessionCommand::MarkerClick {
                kind: MarkerKind::PointOfInterest,
                id: 3
            }
        );
    }

    #[test]
    fn routing_route_keeps_geometry_order() {
        let raw = r#"{"geometry":{"coordinates":[[-122.41,37.78],[-122.42,37.79]],"type":"LineString"},"duration":600.0,"distance":5000.0}"#;
        let route: RoutingRoute = serde_json::from_str(raw).expect("parse");
        let alternative = RouteAlternative::from(route);
        assert_eq!(alternative.geometry[0], Coordinate::new(-122.41, 37.78));
        assert_eq!(alternative.geometry[1], Coordinate::new(-122.42, 37.79));
        assert_eq!(alternative.duration, 600.0);
    }
}
