//! Endpoint resolution for third-party services.
//!
//! A third-party service is one whose backing instances are not orchestrated
//! by this system. Its reachable endpoints come either from a manually
//! curated list in storage or from a live registry subscription; the
//! [`resolve::ResolverFactory`] picks the right strategy per service and
//! [`group::group_by_port`] normalizes the resulting records into per-port
//! address groups.

pub mod group;
pub mod registry;
pub mod resolve;

pub use resolve::{ResolveError, Resolver, ResolverFactory};
