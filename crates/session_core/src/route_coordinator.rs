use shared::{
    domain::{Coordinate, RouteAlternative},
    error::SessionError,
};
use tracing::{debug, warn};

use crate::routing::RouteFetchError;

/// A route query to run off the session task, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub generation: u64,
    pub waypoints: Vec<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Response belonged to a superseded generation and was dropped.
    Stale,
    Applied { alternatives: usize },
}

/// Owns the alternative set and active index for the current waypoint sequence.
///
/// Each evaluation bumps `generation`; a response is applied only when its
/// generation is still current, so superseded results are never observed.
#[derive(Debug, Default)]
pub struct RouteCoordinator {
    generation: u64,
    pending: Option<u64>,
    alternatives: Vec<RouteAlternative>,
    active: usize,
}

impl RouteCoordinator {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alternatives(&self) -> &[RouteAlternative] {
        &self.alternatives
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_loading(&self) -> bool {
        self.pending == Some(self.generation)
    }

    pub fn waypoints_changed(&mut self, waypoints: &[Coordinate]) -> Option<RouteRequest> {
        self.generation += 1;
        if waypoints.len() < 2 {
            self.pending = None;
            self.replace(Vec::new());
            return None;
        }
        self.pending = Some(self.generation);
        Some(RouteRequest {
            generation: self.generation,
            waypoints: waypoints.to_vec(),
        })
    }

    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<Vec<RouteAlternative>, RouteFetchError>,
    ) -> RouteOutcome {
        if generation != self.generation || self.pending != Some(generation) {
            debug!(
                generation,
                current = self.generation,
                "routing: dropping superseded response"
            );
            return RouteOutcome::Stale;
        }
        self.pending = None;
        let alternatives = match result {
            Ok(alternatives) => alternatives,
            Err(err) => {
                warn!(generation, "routing: route fetch failed: {err}");
                Vec::new()
            }
        };
        self.replace(alternatives);
        RouteOutcome::Applied {
            alternatives: self.alternatives.len(),
        }
    }

    /// Makes any outstanding response inert without issuing a new request.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn select_route(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.alternatives.len() {
            return Err(SessionError::InvalidIndex {
                index,
                len: self.alternatives.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    /// Canonical indices in paint order, active route last so it draws on top.
    pub fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.alternatives.len())
            .filter(|index| *index != self.active)
            .collect();
        if self.active < self.alternatives.len() {
            order.push(self.active);
        }
        order
    }

    fn replace(&mut self, alternatives: Vec<RouteAlternative>) {
        self.alternatives = alternatives;
        self.active = 0;
    }
}
