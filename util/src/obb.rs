use cgmath::{InnerSpace, Point3, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::Bounds;

/// A cuboid with arbitrary orientation, described by its center, the half-size along each of its
/// local axes, and the rotation taking the local axes to world axes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct OrientedBox {
    pub center: Point3<f64>,
    pub half_extents: Vector3<f64>,
    pub orientation: Quaternion<f64>,
}

/// How one volume relates to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// The volumes share no points.
    Disjoint,
    /// The volumes overlap but neither holds the other entirely.
    Intersects,
    /// The tested volume lies entirely inside.
    Contains,
}

// cross products shorter than this come from (nearly) parallel edges and are skipped as
// separating axis candidates
const PARALLEL_EPSILON: f64 = 1e-12;

impl OrientedBox {
    pub fn new(
        center: Point3<f64>,
        half_extents: Vector3<f64>,
        orientation: Quaternion<f64>,
    ) -> Self {
        assert!(half_extents.x >= 0.0);
        assert!(half_extents.y >= 0.0);
        assert!(half_extents.z >= 0.0);
        OrientedBox {
            center,
            half_extents,
            orientation: orientation.normalize(),
        }
    }

    pub fn axis_aligned(bounds: Bounds<f64>) -> Self {
        Self::new(
            bounds.center(),
            bounds.size() / 2.,
            Quaternion::new(1., 0., 0., 0.),
        )
    }

    /// The box's local x, y and z axes in world space.
    pub fn axes(&self) -> [Vector3<f64>; 3] {
        [
            self.orientation * Vector3::unit_x(),
            self.orientation * Vector3::unit_y(),
            self.orientation * Vector3::unit_z(),
        ]
    }

    pub fn contains_point(&self, point: Point3<f64>) -> bool {
        let offset = point - self.center;
        let axes = self.axes();
        (0..3).all(|i| offset.dot(axes[i]).abs() <= self.half_extents[i])
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let [ax, ay, az] = self.axes();
        let hx = ax * self.half_extents.x;
        let hy = ay * self.half_extents.y;
        let hz = az * self.half_extents.z;
        let c = self.center;

        [
            c - hx - hy - hz,
            c - hx - hy + hz,
            c - hx + hy - hz,
            c - hx + hy + hz,
            c + hx - hy - hz,
            c + hx - hy + hz,
            c + hx + hy - hz,
            c + hx + hy + hz,
        ]
    }

    /// The smallest axis-aligned bounds holding the whole box.
    pub fn aabb(&self) -> Bounds<f64> {
        let axes = self.axes();
        let reach = |i: usize| {
            (0..3)
                .map(|j| axes[j][i].abs() * self.half_extents[j])
                .sum::<f64>()
        };
        let extent = Vector3::new(reach(0), reach(1), reach(2));
        Bounds::new(self.center - extent, extent * 2.)
    }

    /// Classifies an axis-aligned box against this one. Touching faces count as intersecting.
    pub fn contains_bounds(&self, bounds: Bounds<f64>) -> Containment {
        let box_half = bounds.size() / 2.;
        let offset = bounds.center() - self.center;
        let axes = self.axes();

        let separates = |axis: Vector3<f64>| -> bool {
            if axis.magnitude2() < PARALLEL_EPSILON {
                return false;
            }
            let box_reach = box_half.x * axis.x.abs()
                + box_half.y * axis.y.abs()
                + box_half.z * axis.z.abs();
            let self_reach = (0..3)
                .map(|j| self.half_extents[j] * axes[j].dot(axis).abs())
                .sum::<f64>();
            offset.dot(axis).abs() > box_reach + self_reach
        };

        let world_axes = [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()];

        let disjoint = world_axes.iter().any(|&a| separates(a))
            || axes.iter().any(|&b| separates(b))
            || world_axes
                .iter()
                .any(|&a| axes.iter().any(|&b| separates(a.cross(b))));

        if disjoint {
            Containment::Disjoint
        } else if bounds
            .corners()
            .iter()
            .all(|&corner| self.contains_point(corner))
        {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    pub fn volume(&self) -> f64 {
        8. * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }
}
