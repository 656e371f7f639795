//! Enumerates the blocks a tool's area of effect touches.
//!
//! Every query scans candidate cells, skips empty cells, skips blocks already reported by the
//! same call, and skips blocks that a build preview refuses to build. Surviving blocks are
//! appended to a caller-owned `Vec`, which the query never clears.
//!
//! Volume queries (sphere, cylinder, cuboid) scan every cell of a caller-supplied bounding box,
//! so their cost is proportional to its volume. The box must contain the whole shape: cells
//! outside it are never visited, and nothing checks this. An inverted box scans nothing.

use std::collections::HashSet;
use std::hash::Hash;
use std::mem;

use cgmath::{InnerSpace, MetricSpace, Point3, Vector3};

use toolcore_util::{clamp_point, convert_point, Bounds, Containment, OrientedBox};

use crate::draw::{Color, DebugDraw};
use crate::occupancy::{BuildPermission, CellOccupancy, QueryTarget};
use crate::shape::{Cylinder, Sphere};

/// Scratch state for block queries. Keep one per tool (or per thread) and reuse it; the buffers
/// are cleared at the end of every query and keep their capacity.
#[derive(Debug, Clone)]
pub struct BlockQuery<B> {
    hit_blocks: HashSet<B>,
    hit_positions: Vec<Point3<i64>>,
}

impl<B> Default for BlockQuery<B>
where
    B: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The unit box of a cell, in cell space.
#[inline]
fn cell_box(pos: Point3<i64>) -> Bounds<f64> {
    Bounds::from_center(convert_point!(pos, f64), Vector3::new(1., 1., 1.))
}

impl<B> BlockQuery<B>
where
    B: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        BlockQuery {
            hit_blocks: HashSet::new(),
            hit_positions: Vec::new(),
        }
    }

    /// Blocks with any part of an occupied cell within `sphere.radius` of its center.
    pub fn sphere<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        bounds: Bounds<i64>,
        sphere: &Sphere,
        hits: &mut Vec<B>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        let start = hits.len();
        let radius_sqr = sphere.radius * sphere.radius;

        for pos in bounds.iter_points() {
            let nearest = cell_box(pos).clamp(sphere.center);
            if nearest.distance2(sphere.center) > radius_sqr {
                continue;
            }

            self.collect(target, pos, hits);
        }

        self.finish();
        log::trace!(
            "sphere query {:?} over {:?} hit {} blocks",
            sphere,
            bounds,
            hits.len() - start
        );
    }

    /// Blocks touching `cylinder`.
    ///
    /// For each cell, the cell center is moved onto the axis by removing its offset
    /// perpendicular to `forward`, then clamped per world axis to the box spanned by the two axis
    /// ends. The cell point nearest to that axis point must lie within the radius of it, and its
    /// offset from the center measured along `forward` must be no longer than the full length.
    pub fn cylinder<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        bounds: Bounds<i64>,
        cylinder: &Cylinder,
        hits: &mut Vec<B>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        self.cylinder_impl(target, bounds, cylinder, hits, None)
    }

    /// As `cylinder`, additionally drawing the axis and, for every scanned cell, the axis point
    /// and nearest cell point it was measured between.
    pub fn cylinder_debug<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        bounds: Bounds<i64>,
        cylinder: &Cylinder,
        hits: &mut Vec<B>,
        draw: &mut dyn DebugDraw,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        self.cylinder_impl(target, bounds, cylinder, hits, Some(draw))
    }

    fn cylinder_impl<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        bounds: Bounds<i64>,
        cylinder: &Cylinder,
        hits: &mut Vec<B>,
        mut draw: Option<&mut dyn DebugDraw>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        let start = hits.len();
        let frame = target.grid.frame();

        let center = cylinder.center;
        let forward = cylinder.forward;
        let radius_sqr = cylinder.radius * cylinder.radius;
        let length_sqr = cylinder.length * cylinder.length;

        let end_offset = cylinder.end_offset();
        let end_offset_abs = Vector3::new(
            end_offset.x.abs(),
            end_offset.y.abs(),
            end_offset.z.abs(),
        );
        let axis_min = center - end_offset_abs;
        let axis_max = center + end_offset_abs;

        if let Some(draw) = draw.as_deref_mut() {
            let end1 = frame.cell_space_to_world(center + end_offset);
            let end2 = frame.cell_space_to_world(center - end_offset);
            draw.draw_point(frame.cell_space_to_world(center), 0.3, Color::GREEN);
            draw.draw_point(end1, 0.3, Color::GREEN);
            draw.draw_point(end2, 0.3, Color::GREEN);
            draw.draw_line(end1, end2, Color::GREEN, 0.05);
        }

        for pos in bounds.iter_points() {
            let pos_f = convert_point!(pos, f64);

            let offset = pos_f - center;
            let perpendicular = offset - offset.project_on(forward);

            let axis_point = clamp_point(pos_f - perpendicular, axis_min, axis_max);
            let corner = cell_box(pos).clamp(axis_point);

            if let Some(draw) = draw.as_deref_mut() {
                let a = frame.cell_space_to_world(axis_point);
                let b = frame.cell_space_to_world(corner);
                draw.draw_point(a, 0.1, Color::BLUE);
                draw.draw_point(b, 0.2, Color::RED);
                draw.draw_line(a, b, Color::YELLOW, 0.02);
            }

            if corner.distance2(axis_point) > radius_sqr {
                continue;
            }

            let along_axis = (corner - center).project_on(forward);
            if along_axis.magnitude2() > length_sqr {
                continue;
            }

            self.collect(target, pos, hits);
        }

        self.finish();
        log::trace!(
            "cylinder query {:?} over {:?} hit {} blocks",
            cylinder,
            bounds,
            hits.len() - start
        );
    }

    /// Blocks in cells whose unit box is not disjoint from `obb`.
    pub fn cuboid<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        bounds: Bounds<i64>,
        obb: &OrientedBox,
        hits: &mut Vec<B>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        let start = hits.len();

        for pos in bounds.iter_points() {
            if obb.contains_bounds(cell_box(pos)) == Containment::Disjoint {
                continue;
            }

            self.collect(target, pos, hits);
        }

        self.finish();
        log::trace!(
            "cuboid query over {:?} hit {} blocks",
            bounds,
            hits.len() - start
        );
    }

    /// Blocks along the world-space segment from `start` to `end`, appended nearest first, so
    /// the first new entry is the closest block.
    pub fn line<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        start: Point3<f64>,
        end: Point3<f64>,
        hits: &mut Vec<B>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        let first = hits.len();
        let mut positions = mem::take(&mut self.hit_positions);
        target.grid.cells_along_segment(start, end, &mut positions);

        for &pos in &positions {
            self.collect(target, pos, hits);
        }

        log::trace!(
            "line query from {:?} to {:?} over {} cells hit {} blocks",
            start,
            end,
            positions.len(),
            hits.len() - first
        );

        positions.clear();
        self.hit_positions = positions;
        self.finish();
    }

    /// The block in the cell containing a world position, if there is one and it is buildable.
    pub fn point<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        position: Point3<f64>,
        hits: &mut Vec<B>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        Self::point_impl(target, position, hits, None)
    }

    /// As `point`, additionally marking `position`.
    pub fn point_debug<G, P>(
        &mut self,
        target: &QueryTarget<'_, G, P>,
        position: Point3<f64>,
        hits: &mut Vec<B>,
        draw: &mut dyn DebugDraw,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        Self::point_impl(target, position, hits, Some(draw))
    }

    // at most one block can come back, so there is nothing to deduplicate
    fn point_impl<G, P>(
        target: &QueryTarget<'_, G, P>,
        position: Point3<f64>,
        hits: &mut Vec<B>,
        draw: Option<&mut dyn DebugDraw>,
    ) where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        let cell = target.grid.frame().world_to_cell(position);

        if let Some(draw) = draw {
            draw.draw_point(position, 0.25, Color::VIOLET);
        }

        let block = match target.grid.occupant(cell) {
            Some(block) => block,
            None => return,
        };

        if target.admits(block) {
            hits.push(block);
        }
    }

    #[inline]
    fn collect<G, P>(&mut self, target: &QueryTarget<'_, G, P>, pos: Point3<i64>, hits: &mut Vec<B>)
    where
        G: CellOccupancy<Block = B>,
        P: BuildPermission<B>,
    {
        let block = match target.grid.occupant(pos) {
            Some(block) => block,
            None => return,
        };

        if self.hit_blocks.contains(&block) {
            return;
        }

        if !target.admits(block) {
            return;
        }

        hits.push(block);
        self.hit_blocks.insert(block);
    }

    fn finish(&mut self) {
        self.hit_blocks.clear();
    }
}
