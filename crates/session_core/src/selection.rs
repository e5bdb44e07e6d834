use shared::domain::{Coordinate, PoiId, PointOfInterest, Selection};

/// Single active selection. Each assignment replaces the previous variant wholesale.
#[derive(Debug, Default)]
pub struct SelectionManager {
    current: Selection,
}

impl SelectionManager {
    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn select_point(&mut self, coordinate: Coordinate) {
        self.current = Selection::Point(coordinate);
    }

    pub fn select_waypoint(&mut self, index: usize, coordinate: Coordinate) {
        self.current = Selection::WaypointRef { index, coordinate };
    }

    pub fn select_point_of_interest(&mut self, poi: PointOfInterest) {
        self.current = Selection::PointOfInterestRef(poi);
    }

    pub fn close(&mut self) {
        self.current = Selection::None;
    }

    /// Drops a waypoint selection at `removed` or at any position shifted by its removal.
    pub fn waypoint_removed(&mut self, removed: usize) {
        if let Selection::WaypointRef { index, .. } = self.current {
            if index >= removed {
                self.close();
            }
        }
    }

    pub fn waypoints_cleared(&mut self) {
        if matches!(self.current, Selection::WaypointRef { .. }) {
            self.close();
        }
    }

    pub fn point_of_interest_removed(&mut self, id: PoiId) {
        if let Selection::PointOfInterestRef(poi) = &self.current {
            if poi.id == id {
                self.close();
            }
        }
    }
}
