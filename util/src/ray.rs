use cgmath::Point3;
use std::convert::TryFrom;

/// Visits, nearest first, every cell of a unit lattice that a line segment passes through.
///
/// Cells are centered on integer coordinates, so cell `(i, j, k)` covers `[i - 0.5, i + 0.5]` on
/// each axis. The walk starts at the cell containing the segment's start, steps one face at a
/// time (Amanatides & Woo), and stops after yielding the cell containing the segment's end.
#[derive(Clone, Debug)]
pub struct CellTraversal {
    current: Point3<i64>,
    step: [i64; 3],
    /// Ray parameter at which the next boundary on each axis is crossed.
    t_max: [f64; 3],
    /// Ray parameter between consecutive boundaries on each axis.
    t_delta: [f64; 3],
    /// Boundaries still to be crossed on each axis before reaching the end cell.
    crossings: [u64; 3],
    done: bool,
}

/// Returns the cell whose unit box contains `point`. Points on a shared face belong to the cell
/// on the positive side.
#[inline]
pub fn containing_cell(point: Point3<f64>) -> Point3<i64> {
    Point3::new(
        (point.x + 0.5).floor() as i64,
        (point.y + 0.5).floor() as i64,
        (point.z + 0.5).floor() as i64,
    )
}

impl CellTraversal {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        let current = containing_cell(start);
        let last = containing_cell(end);
        let dir = end - start;

        let mut step = [0i64; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        let mut crossings = [0u64; 3];

        for axis in 0..3 {
            // the span between any two i64 values fits in a u64
            crossings[axis] =
                (i128::from(last[axis]) - i128::from(current[axis])).unsigned_abs() as u64;
            if crossings[axis] == 0 {
                continue;
            }

            let d = dir[axis];
            if d > 0.0 {
                step[axis] = 1;
                t_max[axis] = (current[axis] as f64 + 0.5 - start[axis]) / d;
                t_delta[axis] = 1.0 / d;
            } else {
                step[axis] = -1;
                t_max[axis] = (current[axis] as f64 - 0.5 - start[axis]) / d;
                t_delta[axis] = -1.0 / d;
            }
        }

        CellTraversal {
            current,
            step,
            t_max,
            t_delta,
            crossings,
            done: false,
        }
    }
}

impl Iterator for CellTraversal {
    type Item = Point3<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // only axes with boundaries left to cross are candidates, which guarantees the walk ends
        // exactly on the end cell even when rounding puts a t_max slightly past 1
        let mut axis = None;
        for candidate in 0..3 {
            if self.crossings[candidate] == 0 {
                continue;
            }
            axis = match axis {
                Some(best) if self.t_max[best] <= self.t_max[candidate] => Some(best),
                _ => Some(candidate),
            };
        }

        match axis {
            Some(axis) => {
                self.current[axis] += self.step[axis];
                self.t_max[axis] += self.t_delta[axis];
                self.crossings[axis] -= 1;
            }
            None => self.done = true,
        }

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = self
            .crossings
            .iter()
            .try_fold(1u64, |acc, &c| acc.checked_add(c))
            .and_then(|total| usize::try_from(total).ok());
        match remaining {
            Some(remaining) => (remaining, Some(remaining)),
            None => (usize::MAX, None),
        }
    }
}
