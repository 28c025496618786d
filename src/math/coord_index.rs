use std::collections::HashMap;

use super::{distance, Coord};

/// Spatial hash mapping coordinates to values, matching within a tolerance.
///
/// Coordinates are bucketed on a grid whose cell size equals the tolerance,
/// so every match lies in the 3x3 block of cells around the query.
#[derive(Debug, Clone)]
pub struct CoordIndex<T> {
    tolerance: f64,
    cells: HashMap<(i64, i64), Vec<(Coord, T)>>,
}

impl<T> CoordIndex<T> {
    /// Creates an empty index with the given matching tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell(&self, c: Coord) -> (i64, i64) {
        (
            (c.x / self.tolerance).floor() as i64,
            (c.y / self.tolerance).floor() as i64,
        )
    }

    /// Returns the stored coordinate and value closest to `c` within tolerance.
    #[must_use]
    pub fn find(&self, c: Coord) -> Option<(Coord, &T)> {
        let (cx, cy) = self.cell(c);
        let mut best: Option<(f64, Coord, &T)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for (stored, value) in bucket {
                    let d = distance(*stored, c);
                    if d <= self.tolerance && best.is_none_or(|(bd, _, _)| d < bd) {
                        best = Some((d, *stored, value));
                    }
                }
            }
        }
        best.map(|(_, stored, value)| (stored, value))
    }

    /// Inserts `value` at `c` without checking for an existing match.
    pub fn insert(&mut self, c: Coord, value: T) {
        let key = self.cell(c);
        self.cells.entry(key).or_default().push((c, value));
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T: Clone> CoordIndex<T> {
    /// Returns the value matching `c`, inserting `make()` if there is none.
    pub fn find_or_insert_with(&mut self, c: Coord, make: impl FnOnce() -> T) -> T {
        if let Some((_, value)) = self.find(c) {
            return value.clone();
        }
        let value = make();
        self.insert(c, value.clone());
        value
    }
}

impl CoordIndex<()> {
    /// Builds a snapping pool from a set of reference coordinates.
    pub fn from_coords(tolerance: f64, coords: impl IntoIterator<Item = Coord>) -> Self {
        let mut index = Self::new(tolerance);
        for c in coords {
            if index.find(c).is_none() {
                index.insert(c, ());
            }
        }
        index
    }

    /// Returns the nearest reference coordinate within tolerance, or `c` itself.
    #[must_use]
    pub fn snap(&self, c: Coord) -> Coord {
        self.find(c).map_or(c, |(stored, ())| stored)
    }
}
