//! The interfaces through which the query engine sees a grid and its build previews.

use std::convert::Infallible;
use std::hash::Hash;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use toolcore_util::ray::CellTraversal;

use crate::frame::GridFrame;

/// Read access to which block, if any, occupies each cell of a grid.
pub trait CellOccupancy {
    /// Handle to a block. A block covering several cells returns the same handle for each.
    type Block: Copy + Eq + Hash;

    fn occupant(&self, cell: Point3<i64>) -> Option<Self::Block>;

    fn frame(&self) -> &GridFrame;

    /// Replaces the contents of `cells` with the cells crossed by the world-space segment from
    /// `start` to `end`, nearest to `start` first.
    fn cells_along_segment(
        &self,
        start: Point3<f64>,
        end: Point3<f64>,
        cells: &mut Vec<Point3<i64>>,
    ) {
        let frame = self.frame();
        cells.clear();
        cells.extend(CellTraversal::new(
            frame.world_to_cell_space(start),
            frame.world_to_cell_space(end),
        ));
    }
}

/// Outcome of asking a build preview whether a block may be built where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildCheck {
    Ok,
    AlreadyBuilt,
    NotConnected,
    IntersectedWithGrid,
    IntersectedWithSomethingElse,
    NotFound,
    NotWeldable,
}

/// Build rights of previews (projected blueprints) over blocks.
pub trait BuildPermission<B> {
    type Preview;

    /// The preview that claims `block`, if any.
    fn preview_owner(&self, block: B) -> Option<Self::Preview>;

    fn can_build(&self, preview: &Self::Preview, block: B, check_intersections: bool)
        -> BuildCheck;
}

/// For grids that never carry a build preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreviews;

/// A grid together with the permission rules to filter its blocks by.
pub struct QueryTarget<'a, G, P> {
    pub grid: &'a G,
    pub permissions: &'a P,
}

impl BuildCheck {
    pub fn is_ok(self) -> bool {
        self == BuildCheck::Ok
    }
}

impl<B> BuildPermission<B> for NoPreviews {
    type Preview = Infallible;

    fn preview_owner(&self, _block: B) -> Option<Infallible> {
        None
    }

    fn can_build(&self, preview: &Infallible, _block: B, _check_intersections: bool) -> BuildCheck {
        match *preview {}
    }
}

impl<'a, G, P> QueryTarget<'a, G, P>
where
    G: CellOccupancy,
    P: BuildPermission<G::Block>,
{
    pub fn new(grid: &'a G, permissions: &'a P) -> Self {
        QueryTarget { grid, permissions }
    }

    /// True unless a preview owns `block` and refuses to build it. Evaluated fresh on every
    /// call since preview state changes between ticks.
    #[inline]
    pub fn admits(&self, block: G::Block) -> bool {
        match self.permissions.preview_owner(block) {
            None => true,
            Some(preview) => self.permissions.can_build(&preview, block, true).is_ok(),
        }
    }
}

impl<'a, G> QueryTarget<'a, G, NoPreviews>
where
    G: CellOccupancy,
{
    pub fn unrestricted(grid: &'a G) -> Self {
        QueryTarget {
            grid,
            permissions: &NoPreviews,
        }
    }
}
