use shared::{
    domain::{Coordinate, PeerId, PoiId, PointOfInterest, TrackedPeer},
    error::SessionError,
};

/// Canonical owner of the session's entities.
///
/// Every effective waypoint mutation bumps `waypoint_revision`; the route
/// coordinator re-evaluates whenever it observes a new revision.
#[derive(Debug, Default)]
pub struct EntityStore {
    points_of_interest: Vec<PointOfInterest>,
    next_poi_id: u64,
    waypoints: Vec<Coordinate>,
    waypoint_revision: u64,
    peers: Vec<TrackedPeer>,
    drawn_area: Vec<Coordinate>,
    user_location: Option<Coordinate>,
}

impl EntityStore {
    pub fn new(peers: Vec<TrackedPeer>) -> Self {
        Self {
            peers,
            next_poi_id: 1,
            ..Self::default()
        }
    }

    pub fn points_of_interest(&self) -> &[PointOfInterest] {
        &self.points_of_interest
    }

    pub fn point_of_interest(&self, id: PoiId) -> Option<&PointOfInterest> {
        self.points_of_interest.iter().find(|poi| poi.id == id)
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        &self.waypoints
    }

    pub fn waypoint_revision(&self) -> u64 {
        self.waypoint_revision
    }

    pub fn peers(&self) -> &[TrackedPeer] {
        &self.peers
    }

    pub fn drawn_area(&self) -> &[Coordinate] {
        &self.drawn_area
    }

    pub fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    /// Identity the next `add_point_of_interest` will assign.
    pub fn next_poi_id(&self) -> PoiId {
        PoiId(self.next_poi_id.max(1))
    }

    pub fn add_point_of_interest(
        &mut self,
        coordinate: Coordinate,
        label: impl Into<String>,
    ) -> PoiId {
        let id = self.next_poi_id();
        self.next_poi_id = id.0 + 1;
        self.points_of_interest.push(PointOfInterest {
            id,
            coordinate,
            label: label.into(),
        });
        id
    }

    pub fn remove_point_of_interest(&mut self, id: PoiId) -> Result<PointOfInterest, SessionError> {
        let position = self
            .points_of_interest
            .iter()
            .position(|poi| poi.id == id)
            .ok_or(SessionError::UnknownPointOfInterest(id))?;
        Ok(self.points_of_interest.remove(position))
    }

    pub fn add_waypoint(&mut self, coordinate: Coordinate) {
        self.waypoints.push(coordinate);
        self.waypoint_revision += 1;
    }

    pub fn remove_waypoint(&mut self, index: usize) -> Result<Coordinate, SessionError> {
        if index >= self.waypoints.len() {
            return Err(SessionError::InvalidIndex {
                index,
                len: self.waypoints.len(),
            });
        }
        let removed = self.waypoints.remove(index);
        self.waypoint_revision += 1;
        Ok(removed)
    }

    pub fn clear_waypoints(&mut self) {
        if self.waypoints.is_empty() {
            return;
        }
        self.waypoints.clear();
        self.waypoint_revision += 1;
    }

    /// Swaps in a whole sequence as a single observed change.
    pub fn replace_waypoints(&mut self, waypoints: Vec<Coordinate>) {
        self.waypoints = waypoints;
        self.waypoint_revision += 1;
    }

    pub fn append_drawing_vertex(&mut self, coordinate: Coordinate) {
        self.drawn_area.push(coordinate);
    }

    pub fn clear_drawn_area(&mut self) {
        self.drawn_area.clear();
    }

    pub fn set_user_location(&mut self, coordinate: Coordinate) {
        self.user_location = Some(coordinate);
    }

    pub(crate) fn update_peer_position(&mut self, id: PeerId, coordinate: Coordinate) -> bool {
        match self.peers.iter_mut().find(|peer| peer.id == id) {
            Some(peer) => {
                peer.coordinate = coordinate;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lng: f64, lat: f64) -> Coordinate {
        Coordinate::new(lng, lat)
    }

    #[test]
    fn poi_ids_are_unique_and_monotonic() {
        let mut store = EntityStore::new(Vec::new());
        let a = store.add_point_of_interest(c(0.0, 0.0), "a");
        let b = store.add_point_of_interest(c(1.0, 1.0), "b");
        store.remove_point_of_interest(b).expect("remove");
        let d = store.add_point_of_interest(c(2.0, 2.0), "d");
        assert_eq!(a, PoiId(1));
        assert!(d > b);
        assert_eq!(store.points_of_interest().len(), 2);
    }

    #[test]
    fn remove_waypoint_shifts_later_positions() {
        let mut store = EntityStore::new(Vec::new());
        for i in 0..4 {
            store.add_waypoint(c(i as f64, 0.0));
        }
        store.remove_waypoint(1).expect("remove");
        assert_eq!(store.waypoints(), &[c(0.0, 0.0), c(2.0, 0.0), c(3.0, 0.0)]);
    }

    #[test]
    fn remove_waypoint_out_of_range_is_rejected_without_change() {
        let mut store = EntityStore::new(Vec::new());
        for i in 0..3 {
            store.add_waypoint(c(i as f64, 0.0));
        }
        let revision = store.waypoint_revision();
        let err = store.remove_waypoint(5).expect_err("out of range");
        assert_eq!(err, SessionError::InvalidIndex { index: 5, len: 3 });
        assert_eq!(store.waypoints().len(), 3);
        assert_eq!(store.waypoint_revision(), revision);
    }

    #[test]
    fn clearing_empty_waypoints_does_not_signal_change() {
        let mut store = EntityStore::new(Vec::new());
        store.clear_waypoints();
        assert_eq!(store.waypoint_revision(), 0);
        store.add_waypoint(c(0.0, 0.0));
        store.clear_waypoints();
        store.clear_waypoints();
        assert_eq!(store.waypoint_revision(), 2);
    }

    #[test]
    fn unknown_poi_removal_is_rejected() {
        let mut store = EntityStore::new(Vec::new());
        assert_eq!(
            store.remove_point_of_interest(PoiId(9)),
            Err(SessionError::UnknownPointOfInterest(PoiId(9)))
        );
    }
}
