use shared::domain::DrawingMode;

use crate::{entity_store::EntityStore, selection::SelectionManager};

#[derive(Debug, Default)]
pub struct DrawingModeController {
    mode: DrawingMode,
}

impl DrawingModeController {
    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    pub fn is_drawing(&self) -> bool {
        self.mode == DrawingMode::On
    }

    /// Entering starts a clean session (waypoints, vertices and selection reset);
    /// leaving keeps the captured vertices.
    pub fn toggle(
        &mut self,
        store: &mut EntityStore,
        selection: &mut SelectionManager,
    ) -> DrawingMode {
        self.mode = match self.mode {
            DrawingMode::Off => {
                store.clear_waypoints();
                store.clear_drawn_area();
                selection.close();
                DrawingMode::On
            }
            DrawingMode::On => DrawingMode::Off,
        };
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::Coordinate;

    use super::*;

    #[test]
    fn entering_resets_waypoints_area_and_selection() {
        let mut store = EntityStore::new(Vec::new());
        let mut selection = SelectionManager::default();
        let mut drawing = DrawingModeController::default();
        store.add_waypoint(Coordinate::new(0.0, 0.0));
        store.append_drawing_vertex(Coordinate::new(5.0, 5.0));
        selection.select_point(Coordinate::new(1.0, 1.0));

        assert_eq!(drawing.toggle(&mut store, &mut selection), DrawingMode::On);
        assert!(store.waypoints().is_empty());
        assert!(store.drawn_area().is_empty());
        assert!(selection.current().is_none());
    }

    #[test]
    fn leaving_keeps_vertices() {
        let mut store = EntityStore::new(Vec::new());
        let mut selection = SelectionManager::default();
        let mut drawing = DrawingModeController::default();
        drawing.toggle(&mut store, &mut selection);
        store.append_drawing_vertex(Coordinate::new(1.0, 2.0));
        assert_eq!(drawing.toggle(&mut store, &mut selection), DrawingMode::Off);
        assert_eq!(store.drawn_area(), &[Coordinate::new(1.0, 2.0)]);
    }
}
