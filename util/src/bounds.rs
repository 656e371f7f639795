use cgmath::{BaseNum, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::clamp_point;

/// Half-open axis-aligned box: `origin` is inclusive and `limit` exclusive. Over integers it is a
/// range of grid cells; over floats, a region of space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Bounds<T> {
    origin: Point3<T>,
    size: Vector3<T>,
}

impl<T> Bounds<T> {
    pub fn origin(self) -> Point3<T> {
        self.origin
    }

    pub fn size(self) -> Vector3<T> {
        self.size
    }
}

impl<T: BaseNum> Bounds<T> {
    #[inline]
    pub fn new(origin: Point3<T>, size: Vector3<T>) -> Self {
        assert!(size.x >= T::zero());
        assert!(size.y >= T::zero());
        assert!(size.z >= T::zero());
        Bounds { origin, size }
    }

    #[inline]
    pub fn from_limit(origin: Point3<T>, limit: Point3<T>) -> Self {
        assert!(origin.x <= limit.x);
        assert!(origin.y <= limit.y);
        assert!(origin.z <= limit.z);
        Bounds::new(origin, limit - origin)
    }

    /// Builds the bounds covering the lattice points from `min` to `max`, both inclusive. Unlike
    /// `from_limit` this never panics: an axis where `min` exceeds `max` gets a size of zero, so
    /// the result is empty.
    #[inline]
    pub fn from_inclusive(min: Point3<T>, max: Point3<T>) -> Self {
        let extent = |a: T, b: T| {
            if b >= a {
                b - a + T::one()
            } else {
                T::zero()
            }
        };

        Bounds {
            origin: min,
            size: Vector3::new(extent(min.x, max.x), extent(min.y, max.y), extent(min.z, max.z)),
        }
    }

    #[inline]
    pub fn from_center(center: Point3<T>, size: Vector3<T>) -> Self {
        let origin = center - size / (T::one() + T::one());
        Self::new(origin, size)
    }

    #[inline]
    pub fn limit(self) -> Point3<T> {
        self.origin + self.size
    }

    #[inline]
    pub fn center(self) -> Point3<T> {
        self.origin + self.size / (T::one() + T::one())
    }

    /// True when some axis has zero size.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x == T::zero() || self.size.y == T::zero() || self.size.z == T::zero()
    }

    /// Returns the point inside the closed cuboid `[origin, limit]` nearest to `point`.
    #[inline]
    pub fn clamp(self, point: Point3<T>) -> Point3<T> {
        clamp_point(point, self.origin, self.limit())
    }

    /// Every lattice point in the bounds, x varying fastest and z slowest.
    #[inline]
    pub fn iter_points(self) -> impl Iterator<Item = Point3<T>>
    where
        std::ops::Range<T>: Iterator<Item = T>,
        T: Copy + 'static,
    {
        let origin = self.origin();
        let limit = self.limit();

        (origin.z..limit.z).flat_map(move |z| {
            (origin.y..limit.y)
                .flat_map(move |y| (origin.x..limit.x).map(move |x| Point3 { x, y, z }))
        })
    }

    /// Corner `i` takes the limit on x, y, z where bits 2, 1, 0 of `i` are set.
    #[inline]
    pub fn corners(self) -> [Point3<T>; 8] {
        let a = self.origin();
        let b = self.limit();

        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    #[inline]
    pub fn volume(self) -> T {
        self.size.x * self.size.y * self.size.z
    }
}
