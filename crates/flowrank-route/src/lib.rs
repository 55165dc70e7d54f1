//! Category router.
//!
//! Interprets a parsed classifier record and fans its fields out over
//! four fixed paths, signalling inactive paths as stopped. The routing
//! decision is computed once at construction and is immutable afterwards:
//! every output accessor is a pure read, so query order between outputs
//! cannot change what the host sees. One instance per invocation.

pub mod router;
pub mod sectors;

pub use router::{RouteField, RouteSignal, RoutingDecision};
pub use sectors::normalize_sectors;
