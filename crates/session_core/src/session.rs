use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use shared::{
    domain::{Coordinate, PeerId, PeerStatus, PoiId, RouteAlternative, TrackedPeer},
    error::{ApiError, SessionError},
    protocol::{MarkerKind, SessionCommand, SessionEvent, SessionSnapshot},
};
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    drawing::DrawingModeController,
    entity_store::EntityStore,
    route_coordinator::{RouteCoordinator, RouteOutcome, RouteRequest},
    routing::{RouteFetchError, RoutingService},
    selection::SelectionManager,
    simulator::{LiveSimulator, SimulatorTimer},
};

/// Geolocation error code used when a route needs a location that was never acquired.
pub const POSITION_UNAVAILABLE: i32 = 2;

const COMMAND_QUEUE_CAPACITY: usize = 256;
const EVENT_CAPACITY: usize = 1024;
const TICK_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    pub id: PeerId,
    pub name: String,
    pub status: PeerStatus,
    /// Fixed cyclic path walked by the simulator.
    #[serde(default)]
    pub path: Vec<Coordinate>,
    #[serde(default)]
    pub start_index: usize,
    #[serde(default = "default_simulate")]
    pub simulate: bool,
    /// Position for peers without a path.
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

fn default_simulate() -> bool {
    true
}

impl PeerConfig {
    fn initial_coordinate(&self) -> Option<Coordinate> {
        if self.path.is_empty() {
            self.coordinate
        } else {
            Some(self.path[self.start_index % self.path.len()])
        }
    }
}

/// Initial configuration injected at construction.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub peers: Vec<PeerConfig>,
    /// `None` disables the live simulation timer.
    pub tick_period: Option<Duration>,
}

/// Follow-up work produced by a command that the owner must carry out.
#[derive(Debug, Default)]
pub struct Transition {
    pub route_request: Option<RouteRequest>,
    pub events: Vec<SessionEvent>,
}

/// All session entities and their transitions. Every method runs to completion
/// synchronously; only route fetching happens elsewhere.
#[derive(Debug)]
pub struct SessionState {
    store: EntityStore,
    selection: SelectionManager,
    drawing: DrawingModeController,
    routes: RouteCoordinator,
    simulator: LiveSimulator,
    observed_revision: u64,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        let mut peers = Vec::with_capacity(config.peers.len());
        let mut simulator = LiveSimulator::default();
        for peer in &config.peers {
            let Some(coordinate) = peer.initial_coordinate() else {
                warn!(peer_id = peer.id.0, "session: skipping peer without a position");
                continue;
            };
            peers.push(TrackedPeer {
                id: peer.id,
                name: peer.name.clone(),
                status: peer.status,
                coordinate,
            });
            if peer.simulate {
                simulator.add_track(peer.id, peer.path.clone(), peer.start_index);
            }
        }
        let store = EntityStore::new(peers);
        Self {
            observed_revision: store.waypoint_revision(),
            store,
            selection: SelectionManager::default(),
            drawing: DrawingModeController::default(),
            routes: RouteCoordinator::default(),
            simulator,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn drawing(&self) -> &DrawingModeController {
        &self.drawing
    }

    pub fn routes(&self) -> &RouteCoordinator {
        &self.routes
    }

    pub fn simulator(&self) -> &LiveSimulator {
        &self.simulator
    }

    pub fn apply(&mut self, command: SessionCommand) -> Result<Transition, SessionError> {
        let mut events = Vec::new();
        match command {
            SessionCommand::SurfaceClick { lng, lat } => {
                let coordinate = Coordinate::new(lng, lat);
                if self.drawing.is_drawing() {
                    self.store.append_drawing_vertex(coordinate);
                } else {
                    self.selection.select_point(coordinate);
                }
            }
            SessionCommand::MarkerClick { kind, id } => self.marker_click(kind, id)?,
            SessionCommand::LocateResult { lng, lat } => {
                self.store.set_user_location(Coordinate::new(lng, lat));
            }
            SessionCommand::LocateError { code } => {
                events.push(SessionEvent::LocationUnavailable { code });
            }
            SessionCommand::AddPointOfInterest { label } => {
                let coordinate = self.selected_coordinate()?;
                let label =
                    label.unwrap_or_else(|| format!("Point {}", self.store.next_poi_id()));
                self.store.add_point_of_interest(coordinate, label);
                self.selection.close();
            }
            SessionCommand::RemovePointOfInterest { poi } => {
                self.store.remove_point_of_interest(poi)?;
                self.selection.point_of_interest_removed(poi);
            }
            SessionCommand::AddWaypoint => {
                let coordinate = self.selected_coordinate()?;
                self.store.add_waypoint(coordinate);
                self.selection.close();
            }
            SessionCommand::DeleteWaypoint { index } => {
                self.store.remove_waypoint(index)?;
                self.selection.waypoint_removed(index);
            }
            SessionCommand::SelectRoute { index } => self.routes.select_route(index)?,
            SessionCommand::ToggleDrawing => {
                let mode = self.drawing.toggle(&mut self.store, &mut self.selection);
                debug!(?mode, "session: drawing mode toggled");
            }
            SessionCommand::ClearWaypoints => {
                self.store.clear_waypoints();
                self.selection.waypoints_cleared();
            }
            SessionCommand::ClearDrawnArea => self.store.clear_drawn_area(),
            SessionCommand::RouteFromLocationTo { poi } => self.route_from_location_to(poi)?,
            SessionCommand::CloseSelection => self.selection.close(),
        }

        Ok(Transition {
            route_request: self.observe_waypoints(),
            events,
        })
    }

    pub fn tick(&mut self) {
        for (peer_id, coordinate) in self.simulator.tick() {
            self.store.update_peer_position(peer_id, coordinate);
        }
    }

    pub fn apply_route_result(
        &mut self,
        generation: u64,
        result: Result<Vec<RouteAlternative>, RouteFetchError>,
    ) -> RouteOutcome {
        self.routes.apply(generation, result)
    }

    /// Stops outstanding route work from ever landing.
    pub fn invalidate_routes(&mut self) {
        self.routes.invalidate();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            points_of_interest: self.store.points_of_interest().to_vec(),
            waypoints: self.store.waypoints().to_vec(),
            peers: self.store.peers().to_vec(),
            routes: self.routes.alternatives().to_vec(),
            active_route: self.routes.active_index(),
            route_display_order: self.routes.display_order(),
            is_loading_route: self.routes.is_loading(),
            selection: self.selection.current().clone(),
            drawn_area: self.store.drawn_area().to_vec(),
            drawing_mode: self.drawing.mode(),
            user_location: self.store.user_location(),
        }
    }

    fn marker_click(&mut self, kind: MarkerKind, id: u64) -> Result<(), SessionError> {
        match kind {
            MarkerKind::Waypoint => {
                let index = usize::try_from(id).unwrap_or(usize::MAX);
                let coordinate = self.store.waypoints().get(index).copied().ok_or(
                    SessionError::InvalidIndex {
                        index,
                        len: self.store.waypoints().len(),
                    },
                )?;
                if self.drawing.is_drawing() {
                    self.store.append_drawing_vertex(coordinate);
                } else {
                    self.selection.select_waypoint(index, coordinate);
                }
            }
            MarkerKind::PointOfInterest => {
                let poi = self
                    .store
                    .point_of_interest(PoiId(id))
                    .cloned()
                    .ok_or(SessionError::UnknownPointOfInterest(PoiId(id)))?;
                if self.drawing.is_drawing() {
                    self.store.append_drawing_vertex(poi.coordinate);
                } else {
                    self.selection.select_point_of_interest(poi);
                }
            }
        }
        Ok(())
    }

    fn route_from_location_to(&mut self, poi: PoiId) -> Result<(), SessionError> {
        let target = self
            .store
            .point_of_interest(poi)
            .map(|poi| poi.coordinate)
            .ok_or(SessionError::UnknownPointOfInterest(poi))?;
        let origin = self
            .store
            .user_location()
            .ok_or(SessionError::LocationUnavailable {
                code: POSITION_UNAVAILABLE,
            })?;
        self.store.replace_waypoints(vec![origin, target]);
        self.selection.waypoints_cleared();
        Ok(())
    }

    fn selected_coordinate(&self) -> Result<Coordinate, SessionError> {
        self.selection
            .current()
            .coordinate()
            .ok_or(SessionError::NoSelection)
    }

    fn observe_waypoints(&mut self) -> Option<RouteRequest> {
        let revision = self.store.waypoint_revision();
        if revision == self.observed_revision {
            return None;
        }
        self.observed_revision = revision;
        self.routes.waypoints_changed(self.store.waypoints())
    }
}

enum SessionMessage {
    Command {
        command: SessionCommand,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Shutdown,
}

struct RouteCompletion {
    generation: u64,
    result: Result<Vec<RouteAlternative>, RouteFetchError>,
}

/// Owner task: the only place session state is mutated.
struct SessionActor {
    state: SessionState,
    routing: Arc<dyn RoutingService>,
    messages: mpsc::Receiver<SessionMessage>,
    completions_tx: mpsc::UnboundedSender<RouteCompletion>,
    completions: mpsc::UnboundedReceiver<RouteCompletion>,
    ticks: mpsc::Receiver<u64>,
    timer: Option<SimulatorTimer>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionActor {
    async fn run(mut self) {
        info!("session: started");
        loop {
            tokio::select! {
                message = self.messages.recv() => match message {
                    Some(SessionMessage::Command { command, reply }) => {
                        let result = self.handle_command(command);
                        self.publish();
                        let _ = reply.send(result);
                    }
                    Some(SessionMessage::Shutdown) | None => break,
                },
                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion);
                    self.publish();
                }
                Some(_) = self.ticks.recv() => {
                    self.state.tick();
                    self.publish();
                }
            }
        }
        self.teardown();
    }

    fn handle_command(&mut self, command: SessionCommand) -> Result<(), SessionError> {
        match self.state.apply(command) {
            Ok(transition) => {
                for event in transition.events {
                    let _ = self.events.send(event);
                }
                if let Some(request) = transition.route_request {
                    self.spawn_route_request(request);
                }
                Ok(())
            }
            Err(err) => {
                debug!("session: command rejected: {err}");
                if let SessionError::LocationUnavailable { code } = err {
                    let _ = self.events.send(SessionEvent::LocationUnavailable { code });
                }
                let _ = self.events.send(SessionEvent::Error(ApiError::from(&err)));
                Err(err)
            }
        }
    }

    fn spawn_route_request(&self, request: RouteRequest) {
        debug!(
            generation = request.generation,
            waypoints = request.waypoints.len(),
            "session: issuing route request"
        );
        let routing = Arc::clone(&self.routing);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = routing.fetch_routes(&request.waypoints).await;
            let _ = completions.send(RouteCompletion {
                generation: request.generation,
                result,
            });
        });
    }

    fn handle_completion(&mut self, completion: RouteCompletion) {
        let generation = completion.generation;
        match self.state.apply_route_result(generation, completion.result) {
            RouteOutcome::Stale => {}
            RouteOutcome::Applied { alternatives } => {
                info!(generation, alternatives, "session: routes updated");
                if alternatives == 0 {
                    let _ = self.events.send(SessionEvent::NoRouteAvailable);
                }
                let _ = self.events.send(SessionEvent::RouteApplied {
                    generation,
                    alternatives,
                });
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.snapshot());
    }

    fn teardown(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
        self.state.invalidate_routes();
        self.publish();
        info!("session: stopped");
    }
}

/// Collaborator-facing handle: commands in, snapshots and events out.
pub struct SessionHandle {
    messages: mpsc::Sender<SessionMessage>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub async fn dispatch(&self, command: SessionCommand) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.messages
            .send(SessionMessage::Command { command, reply })
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)?
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stops the timer, makes in-flight route responses inert and waits for the owner task.
    pub async fn shutdown(&mut self) {
        let _ = self.messages.send(SessionMessage::Shutdown).await;
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("session: owner task ended abnormally: {err}");
            }
        }
    }
}

pub struct Session;

impl Session {
    pub fn spawn(config: SessionConfig, routing: Arc<dyn RoutingService>) -> SessionHandle {
        let state = SessionState::new(&config);
        let (messages_tx, messages) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (ticks_tx, ticks) = mpsc::channel(TICK_QUEUE_CAPACITY);
        let (snapshots, snapshots_rx) = watch::channel(state.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let timer = config
            .tick_period
            .map(|period| SimulatorTimer::start(period, ticks_tx));

        let actor = SessionActor {
            state,
            routing,
            messages,
            completions_tx,
            completions,
            ticks,
            timer,
            snapshots,
            events: events.clone(),
        };
        let task = tokio::spawn(actor.run());

        SessionHandle {
            messages: messages_tx,
            snapshots: snapshots_rx,
            events,
            task: Some(task),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
