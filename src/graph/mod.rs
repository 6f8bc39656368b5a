//! Relationship graph: snapshot building and search focus.

mod focus;
mod model;

pub use focus::{FocusResult, VisibleNode, focus, matches};
pub use model::{BuildReport, ConnectionEdge, ContactNode, GraphModel, RawGraph, build};
