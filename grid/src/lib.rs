//! Block queries against cube grids: which blocks does a tool's area of effect touch.
//!
//! The host game owns the grid. It is reached through the narrow traits in [`occupancy`], so the
//! query engine can run against the host or against the in-memory [`BlockGrid`].
pub mod draw;
pub mod frame;
pub mod limits;
pub mod occupancy;
pub mod query;
pub mod shape;
pub mod store;

pub use crate::{
    draw::{Color, DebugDraw, DrawCommand, RecordingDraw},
    frame::GridFrame,
    limits::{BlockLimitsMode, Builder, WorldLimits},
    occupancy::{BuildCheck, BuildPermission, CellOccupancy, NoPreviews, QueryTarget},
    query::BlockQuery,
    shape::{Cylinder, Sphere},
    store::{BlockGrid, BlockId, BlockInfo},
};
pub use toolcore_util::{Bounds, Containment, OrientedBox};
