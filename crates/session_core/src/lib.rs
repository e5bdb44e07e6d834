//! Session state coordinator for a live geospatial session.
//!
//! All entity state lives in one owner task ([`Session`]); the rendering layer
//! talks to it through a [`SessionHandle`].

pub mod drawing;
pub mod entity_store;
pub mod route_coordinator;
pub mod routing;
pub mod selection;
pub mod session;
pub mod simulator;

pub use route_coordinator::{RouteCoordinator, RouteOutcome, RouteRequest};
pub use routing::{
    HttpRoutingService, MissingRoutingService, RouteFetchError, RoutingOptions, RoutingService,
};
pub use session::{PeerConfig, Session, SessionConfig, SessionHandle, SessionState, Transition};
pub use simulator::{LiveSimulator, SimulatorTimer};
