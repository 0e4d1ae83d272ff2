#![forbid(unsafe_code)]

//! Path-based routing collaborator for weft document trees.
//!
//! A [`Router`] pairs a [`RouteTable`] (exact patterns or single trailing
//! `*` wildcards) with a [`ComponentRegistry`] over one
//! [`Document`](weft_dom::Document): clicks on `navigate`-marked elements,
//! explicit [`navigate`](Router::navigate) calls, and session
//! [`History`] steps all resolve to a route, mount the named component in
//! the outlet, and update the document title (with `{}` parameter
//! substitution).

pub mod history;
pub mod registry;
pub mod router;
pub mod routes;

pub use history::History;
pub use registry::{ComponentRegistry, MountFn};
pub use router::{MountContext, NAVIGATE_ATTR, OUTLET_ID, Router};
pub use routes::{NOT_FOUND_PATH, RouteEntry, RouteMatch, RouteTable, normalize_path};
