//! Spatial shape and voxel index constructs.
//!
//! Volumes in this crate are indexed by `(x, y, z)` in space, with time as a
//! separate fourth axis. Whenever voxels need to be enumerated, the
//! traversal follows the standard NIfTI volume order (column major): `x`
//! varies fastest, then `y`, then `z`. Equivalently, coordinates are visited
//! in lexicographic order of `(z, y, x)`. This order is what assigns
//! signal matrix columns to masked voxels, so it must never change between
//! calls.

/// A voxel coordinate in space, as `[x, y, z]`.
pub type Coord = [usize; 3];

/// The spatial extent of a volume, as `[nx, ny, nz]`.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct SpatialDim([usize; 3]);

impl SpatialDim {
    /// Create a new spatial shape.
    ///
    /// # Example
    ///
    /// ```
    /// # use fmriqc::volume::shape::SpatialDim;
    /// let dim = SpatialDim::new([64, 32, 16]);
    /// assert_eq!(dim.as_ref(), &[64, 32, 16]);
    /// assert_eq!(dim.element_count(), 64 * 32 * 16);
    /// ```
    pub fn new(dim: [usize; 3]) -> Self {
        SpatialDim(dim)
    }

    /// Retrieve the shape as a plain array.
    pub fn raw(&self) -> [usize; 3] {
        self.0
    }

    /// Calculate the number of voxels in this shape.
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Whether the given coordinate lies within this shape.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.iter().zip(&self.0).all(|(c, d)| c < d)
    }

    /// Map a coordinate to its rank in the column-major traversal.
    /// Returns `None` if the coordinate is out of bounds.
    ///
    /// # Example
    ///
    /// ```
    /// # use fmriqc::volume::shape::SpatialDim;
    /// let dim = SpatialDim::new([16, 16, 3]);
    /// assert_eq!(dim.linear_index([1, 1, 1]), Some(273));
    /// assert_eq!(dim.linear_index([16, 0, 0]), None);
    /// ```
    pub fn linear_index(&self, [x, y, z]: Coord) -> Option<usize> {
        if !self.contains([x, y, z]) {
            return None;
        }
        let [nx, ny, _] = self.0;
        Some(x + (y + z * ny) * nx)
    }

    /// Map a column-major rank back to its coordinate.
    /// Returns `None` if the index is out of bounds.
    pub fn coord_of(&self, index: usize) -> Option<Coord> {
        if index >= self.element_count() {
            return None;
        }
        let [nx, ny, _] = self.0;
        let z = index / (nx * ny);
        let r = index % (nx * ny);
        Some([r % nx, r / nx, z])
    }

    /// Provide an iterator traversing through all possible coordinates of a
    /// hypothetical volume with this shape.
    pub fn index_iter(&self) -> DimIter {
        DimIter::new(*self)
    }
}

impl AsRef<[usize]> for SpatialDim {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<[usize; 3]> for SpatialDim {
    fn from(dim: [usize; 3]) -> Self {
        SpatialDim(dim)
    }
}

/// An iterator of all coordinates in a 3-dimensional volume.
///
/// Traversal is in standard NIfTI volume order (column major).
#[derive(Debug, Clone)]
pub struct DimIter {
    shape: SpatialDim,
    state: DimIterState,
}

#[derive(Debug, Copy, Clone)]
enum DimIterState {
    First,
    Middle(Coord),
    Fused,
}

impl DimIter {
    fn new(shape: SpatialDim) -> Self {
        let state = if shape.element_count() == 0 {
            DimIterState::Fused
        } else {
            DimIterState::First
        };
        DimIter { shape, state }
    }
}

impl Iterator for DimIter {
    type Item = Coord;

    fn next(&mut self) -> Option<Self::Item> {
        let (out, next_state) = match self.state {
            DimIterState::First => {
                let out = [0, 0, 0];
                (Some(out), DimIterState::Middle(out))
            }
            DimIterState::Fused => (None, DimIterState::Fused),
            DimIterState::Middle(mut current) => {
                let mut good = false;
                for (c, s) in Iterator::zip(current.iter_mut(), self.shape.0.iter()) {
                    if *c < *s - 1 {
                        *c += 1;
                        good = true;
                        break;
                    }
                    *c = 0;
                }
                if good {
                    (Some(current), DimIterState::Middle(current))
                } else {
                    (None, DimIterState::Fused)
                }
            }
        };
        self.state = next_state;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialDim;
    use proptest::prelude::*;

    #[test]
    fn test_dim() {
        let dim = SpatialDim::new([256, 256, 100]);
        assert_eq!(dim.as_ref(), &[256, 256, 100]);
        assert_eq!(dim.element_count(), 6553600);
    }

    #[test]
    fn test_linear_index() {
        let dim = SpatialDim::new([16, 16, 3]);
        assert_eq!(dim.linear_index([0, 0, 0]), Some(0));
        assert_eq!(dim.linear_index([1, 0, 0]), Some(1));
        assert_eq!(dim.linear_index([0, 1, 0]), Some(16));
        assert_eq!(dim.linear_index([0, 0, 1]), Some(256));
        assert_eq!(dim.linear_index([15, 15, 2]), Some(16 * 16 * 3 - 1));
        assert_eq!(dim.linear_index([16, 15, 2]), None);
        assert_eq!(dim.linear_index([0, 0, 3]), None);
    }

    #[test]
    fn test_dim_iter() {
        let dim = SpatialDim::new([3, 2, 2]);
        let idx: Vec<_> = dim.index_iter().take(13).collect();
        assert_eq!(idx.len(), dim.element_count());
        assert_eq!(
            idx,
            vec![
                [0, 0, 0],
                [1, 0, 0],
                [2, 0, 0],
                [0, 1, 0],
                [1, 1, 0],
                [2, 1, 0],
                [0, 0, 1],
                [1, 0, 1],
                [2, 0, 1],
                [0, 1, 1],
                [1, 1, 1],
                [2, 1, 1],
            ]
        );
    }

    #[test]
    fn test_dim_iter_empty() {
        assert_eq!(SpatialDim::new([4, 0, 2]).index_iter().count(), 0);
        assert_eq!(SpatialDim::new([1, 1, 1]).index_iter().count(), 1);
    }

    // A strategy that picks a shape, and a linear index guaranteed to lie
    // within it.
    fn shape_and_in_range_index() -> impl Strategy<Value = ([usize; 3], usize)> {
        [1..40_usize, 1..40_usize, 1..40_usize]
            .prop_flat_map(|d| (Just(d), 0..(d[0] * d[1] * d[2])))
    }

    proptest! {
        #[test]
        fn index_roundtrip((shape, index) in shape_and_in_range_index()) {
            let dim = SpatialDim::new(shape);
            let coord = dim.coord_of(index).unwrap();
            prop_assert_eq!(dim.linear_index(coord), Some(index));
        }

        #[test]
        fn iter_matches_rank(shape in [1..8_usize, 1..8_usize, 1..8_usize]) {
            let dim = SpatialDim::new(shape);
            for (rank, coord) in dim.index_iter().enumerate() {
                prop_assert_eq!(dim.linear_index(coord), Some(rank));
            }
        }
    }
}
