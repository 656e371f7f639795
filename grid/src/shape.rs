//! Tool areas of effect, in grid cell space.
//!
//! Each shape can report the range of cells it may touch. Queries never derive that range
//! themselves; callers pass it in, and these helpers give a range that is guaranteed to be large
//! enough.

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use toolcore_util::{Bounds, OrientedBox};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

/// A cylinder around the axis through `center` along `forward`, `length` long in total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub center: Point3<f64>,
    /// Unit vector along the axis.
    pub forward: Vector3<f64>,
    pub radius: f64,
    pub length: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Sphere { center, radius }
    }

    pub fn cell_bounds(&self) -> Bounds<i64> {
        let reach = Vector3::new(self.radius, self.radius, self.radius);
        cells_touching(self.center - reach, self.center + reach)
    }
}

impl Cylinder {
    pub fn new(center: Point3<f64>, forward: Vector3<f64>, radius: f64, length: f64) -> Self {
        Cylinder {
            center,
            forward,
            radius,
            length,
        }
    }

    /// Offset from the center to one end of the axis.
    #[inline]
    pub fn end_offset(&self) -> Vector3<f64> {
        self.forward * (self.length / 2.)
    }

    pub fn cell_bounds(&self) -> Bounds<i64> {
        // the query measures the radius from a point clamped to the box spanned by the two axis
        // ends, so the radius is added on top of that box
        let end = self.end_offset();
        let reach = Vector3::new(
            end.x.abs() + self.radius,
            end.y.abs() + self.radius,
            end.z.abs() + self.radius,
        );
        cells_touching(self.center - reach, self.center + reach)
    }
}

/// The cells a box query over `obb` may touch.
pub fn oriented_box_cell_bounds(obb: &OrientedBox) -> Bounds<i64> {
    let aabb = obb.aabb();
    cells_touching(aabb.origin(), aabb.limit())
}

/// The inclusive range of cells whose unit boxes overlap the closed box from `min` to `max`.
pub fn cells_touching(min: Point3<f64>, max: Point3<f64>) -> Bounds<i64> {
    let low = |v: f64| (v - 0.5).ceil() as i64;
    let high = |v: f64| (v + 0.5).floor() as i64;
    Bounds::from_inclusive(
        Point3::new(low(min.x), low(min.y), low(min.z)),
        Point3::new(high(max.x), high(max.y), high(max.z)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_touching() {
        let bounds = cells_touching(Point3::new(-0.5, 0.2, 1.), Point3::new(0.5, 0.4, 1.));
        assert_eq!(bounds.origin(), Point3::new(-1, 0, 1));
        assert_eq!(bounds.limit(), Point3::new(2, 1, 2));
    }

    #[test]
    fn test_sphere_bounds() {
        let sphere = Sphere::new(Point3::new(0., 0., 0.), 1.);
        let bounds = sphere.cell_bounds();
        assert_eq!(bounds.origin(), Point3::new(-1, -1, -1));
        assert_eq!(bounds.limit(), Point3::new(2, 2, 2));

        let point = Sphere::new(Point3::new(3.2, 0., 0.), 0.);
        assert_eq!(point.cell_bounds().volume(), 1);
    }

    #[test]
    fn test_cylinder_bounds() {
        let cylinder = Cylinder::new(Point3::new(0., 0., 0.), Vector3::unit_x(), 1., 4.);
        let bounds = cylinder.cell_bounds();
        assert_eq!(bounds.origin(), Point3::new(-3, -1, -1));
        assert_eq!(bounds.limit(), Point3::new(4, 2, 2));
    }
}
