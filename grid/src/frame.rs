use cgmath::{EuclideanSpace, InnerSpace, Point3, Quaternion};

/// Places a grid in the world: where its origin sits, how it is rotated, and how large each cell
/// is.
///
/// Three coordinate systems are involved. World space is shared by everything. Local space is
/// world space translated and rotated so the grid origin is at zero. Cell space is local space
/// divided by the cell size, so cells are unit boxes centered on integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    position: Point3<f64>,
    orientation: Quaternion<f64>,
    cell_size: f64,
}

impl GridFrame {
    pub fn new(position: Point3<f64>, orientation: Quaternion<f64>, cell_size: f64) -> Self {
        assert!(cell_size > 0.);
        GridFrame {
            position,
            orientation: orientation.normalize(),
            cell_size,
        }
    }

    /// A grid at the world origin with no rotation.
    pub fn axis_aligned(cell_size: f64) -> Self {
        Self::new(Point3::origin(), Quaternion::new(1., 0., 0., 0.), cell_size)
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn orientation(&self) -> Quaternion<f64> {
        self.orientation
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn world_to_local(&self, point: Point3<f64>) -> Point3<f64> {
        Point3::from_vec(self.orientation.conjugate() * (point - self.position))
    }

    #[inline]
    pub fn local_to_world(&self, point: Point3<f64>) -> Point3<f64> {
        self.position + self.orientation * point.to_vec()
    }

    #[inline]
    pub fn world_to_cell_space(&self, point: Point3<f64>) -> Point3<f64> {
        self.world_to_local(point) / self.cell_size
    }

    #[inline]
    pub fn cell_space_to_world(&self, point: Point3<f64>) -> Point3<f64> {
        self.local_to_world(point * self.cell_size)
    }

    /// The cell containing a world position, rounding each cell-space coordinate to the nearest
    /// integer. A position exactly on a face between two cells goes to the even one.
    #[inline]
    pub fn world_to_cell(&self, point: Point3<f64>) -> Point3<i64> {
        let p = self.world_to_cell_space(point);
        Point3::new(
            round_half_even(p.x) as i64,
            round_half_even(p.y) as i64,
            round_half_even(p.z) as i64,
        )
    }
}

#[inline]
fn round_half_even(v: f64) -> f64 {
    if (v - v.trunc()).abs() == 0.5 {
        2. * (v / 2.).round()
    } else {
        v.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cgmath::{Deg, Rotation3, Vector3};

    fn assert_close(a: Point3<f64>, b: Point3<f64>) {
        assert!((a - b).magnitude() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_axis_aligned_frame() {
        let frame = GridFrame::axis_aligned(2.5);
        assert_close(
            frame.world_to_cell_space(Point3::new(5., -2.5, 1.25)),
            Point3::new(2., -1., 0.5),
        );
        assert_eq!(frame.world_to_cell(Point3::new(5., -2.5, 1.1)), Point3::new(2, -1, 0));
        assert_eq!(frame.world_to_cell(Point3::new(3.8, 0., 0.)), Point3::new(2, 0, 0));
    }

    #[test]
    fn test_faces_round_to_even_cell() {
        let frame = GridFrame::axis_aligned(1.);
        assert_eq!(frame.world_to_cell(Point3::new(0.5, 2.5, -1.5)), Point3::new(0, 2, -2));
        assert_eq!(frame.world_to_cell(Point3::new(-0.5, 3.5, 1.5)), Point3::new(0, 4, 2));
        assert_eq!(frame.world_to_cell(Point3::new(0.49, 2.51, -1.51)), Point3::new(0, 3, -2));

        assert_eq!(round_half_even(-2.5), -2.);
        assert_eq!(round_half_even(7.3), 7.);
        assert_eq!(round_half_even(-7.7), -8.);
    }

    #[test]
    fn test_rotated_frame_round_trip() {
        let frame = GridFrame::new(
            Point3::new(10., 0., -4.),
            Quaternion::from_angle_z(Deg(90.)),
            0.5,
        );

        // local +x points along world +y after a quarter turn about z
        assert_close(
            frame.cell_space_to_world(Point3::new(2., 0., 0.)),
            Point3::new(10., 1., -4.),
        );
        assert_eq!(frame.world_to_cell(Point3::new(10., 1., -4.)), Point3::new(2, 0, 0));

        let p = Point3::new(3.25, -7.5, 0.125);
        assert_close(frame.local_to_world(frame.world_to_local(p)), p);
        assert_close(frame.cell_space_to_world(frame.world_to_cell_space(p)), p);
        assert_close(
            frame.local_to_world(Point3::origin() + Vector3::unit_y()),
            Point3::new(9., 0., -4.),
        );
    }
}
