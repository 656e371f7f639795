pub mod bounds;
pub mod obb;
pub mod ray;
pub mod timings;

use cgmath::{BaseNum, Point3};

pub use bounds::Bounds;
pub use obb::{Containment, OrientedBox};
pub use timings::{TimingSummary, Timings};

#[macro_export]
macro_rules! convert_point {
    ($val:expr, $type:ty) => {
        cgmath::Point3 {
            x: $val.x as $type,
            y: $val.y as $type,
            z: $val.z as $type,
        }
    };
}

/// Clamps each coordinate of `point` into the closed range given by `min` and `max`.
#[inline]
pub fn clamp_point<T: BaseNum>(point: Point3<T>, min: Point3<T>, max: Point3<T>) -> Point3<T> {
    let clamp = |x, a, b| {
        if x >= a {
            if x < b {
                x
            } else {
                b
            }
        } else {
            a
        }
    };

    Point3 {
        x: clamp(point.x, min.x, max.x),
        y: clamp(point.y, min.y, max.y),
        z: clamp(point.z, min.z, max.z),
    }
}
