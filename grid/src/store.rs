use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use cgmath::Point3;

use toolcore_util::Bounds;

use crate::frame::GridFrame;
use crate::occupancy::{BuildCheck, BuildPermission, CellOccupancy};

/// Index of a block in a `BlockGrid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BlockId(u32);

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub name: String,
    /// Cells covered by the block.
    pub cells: Bounds<i64>,
}

/// A build preview attached to a grid. Blocks it refuses carry the refusal reason.
#[derive(Debug, Clone, Default)]
struct Projector {
    refused: HashMap<BlockId, BuildCheck>,
}

/// An in-memory grid of blocks, each covering a cuboid of cells.
#[derive(Debug, Clone)]
pub struct BlockGrid {
    frame: GridFrame,
    cells: HashMap<Point3<i64>, BlockId>,
    blocks: Vec<BlockInfo>,
    projector: Option<Projector>,
}

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BlockGrid {
    pub fn new(frame: GridFrame) -> Self {
        BlockGrid {
            frame,
            cells: HashMap::new(),
            blocks: Vec::new(),
            projector: None,
        }
    }

    /// Places a block covering every cell from `min` to `max` inclusive. Fails if the range is
    /// inverted or any of its cells is already taken.
    pub fn place(&mut self, name: &str, min: Point3<i64>, max: Point3<i64>) -> Result<BlockId> {
        let cells = Bounds::from_inclusive(min, max);
        if cells.is_empty() {
            bail!("block {} has inverted extent {:?} to {:?}", name, min, max);
        }

        if let Some((pos, other)) = cells
            .iter_points()
            .find_map(|pos| self.cells.get(&pos).map(|&other| (pos, other)))
        {
            bail!(
                "block {} overlaps block {} at {:?}",
                name,
                self.blocks[other.index()].name,
                pos
            );
        }

        let id = BlockId(self.blocks.len() as u32);
        self.cells.extend(cells.iter_points().map(|pos| (pos, id)));
        self.blocks.push(BlockInfo {
            name: name.to_string(),
            cells,
        });

        log::debug!("placed block {} ({:?}) over {:?}", name, id, cells);
        Ok(id)
    }

    pub fn place_cell(&mut self, name: &str, cell: Point3<i64>) -> Result<BlockId> {
        self.place(name, cell, cell)
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockInfo> {
        self.blocks.get(id.index())
    }

    pub fn block_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|info| info.name == name)
            .map(|index| BlockId(index as u32))
    }

    pub fn name(&self, id: BlockId) -> &str {
        self.block(id).map_or("<unknown>", |info| info.name.as_str())
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BlockInfo)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, info)| (BlockId(index as u32), info))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn has_projector(&self) -> bool {
        self.projector.is_some()
    }

    /// Attaches a build preview that admits every block until told otherwise.
    pub fn attach_projector(&mut self) {
        self.projector.get_or_insert_with(Projector::default);
    }

    pub fn detach_projector(&mut self) {
        self.projector = None;
    }

    /// Makes the attached preview answer `result` for `block`. Passing `BuildCheck::Ok` lifts an
    /// earlier refusal.
    pub fn set_build_check(&mut self, block: BlockId, result: BuildCheck) -> Result<()> {
        let projector = self
            .projector
            .as_mut()
            .ok_or_else(|| anyhow!("grid has no projector attached"))?;

        if result.is_ok() {
            projector.refused.remove(&block);
        } else {
            projector.refused.insert(block, result);
        }
        Ok(())
    }
}

impl CellOccupancy for BlockGrid {
    type Block = BlockId;

    #[inline]
    fn occupant(&self, cell: Point3<i64>) -> Option<BlockId> {
        self.cells.get(&cell).copied()
    }

    fn frame(&self) -> &GridFrame {
        &self.frame
    }
}

impl BuildPermission<BlockId> for BlockGrid {
    type Preview = ();

    fn preview_owner(&self, _block: BlockId) -> Option<()> {
        self.projector.as_ref().map(|_| ())
    }

    fn can_build(&self, _preview: &(), block: BlockId, _check_intersections: bool) -> BuildCheck {
        self.projector
            .as_ref()
            .and_then(|projector| projector.refused.get(&block).copied())
            .unwrap_or(BuildCheck::Ok)
    }
}
