use session_core::PeerConfig;
use shared::domain::{Coordinate, PeerId, PeerStatus};

/// Peers used when the settings file supplies none: two walkers looping
/// around downtown San Francisco and one stationary offline peer.
pub fn demo_peers() -> Vec<PeerConfig> {
    vec![
        PeerConfig {
            id: PeerId(1),
            name: "Alice".into(),
            status: PeerStatus::Online,
            path: loop_path(&[
                (-122.4194, 37.7749),
                (-122.4184, 37.7759),
                (-122.4174, 37.7769),
                (-122.4164, 37.7759),
                (-122.4174, 37.7749),
            ]),
            start_index: 0,
            simulate: true,
            coordinate: None,
        },
        PeerConfig {
            id: PeerId(2),
            name: "Bob".into(),
            status: PeerStatus::Online,
            path: loop_path(&[
                (-122.4089, 37.7837),
                (-122.4079, 37.7847),
                (-122.4069, 37.7837),
                (-122.4079, 37.7827),
            ]),
            start_index: 2,
            simulate: true,
            coordinate: None,
        },
        PeerConfig {
            id: PeerId(3),
            name: "Carol".into(),
            status: PeerStatus::Offline,
            path: Vec::new(),
            start_index: 0,
            simulate: false,
            coordinate: Some(Coordinate::new(-122.4313, 37.7730)),
        },
    ]
}

fn loop_path(points: &[(f64, f64)]) -> Vec<Coordinate> {
    points
        .iter()
        .map(|&(lng, lat)| Coordinate::new(lng, lat))
        .collect()
}
