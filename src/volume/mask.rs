//! Module holding the binary mask volume.

use super::element::MaskElement;
use super::shape::{Coord, SpatialDim};
use ndarray::{Array3, ArrayView3};

/// A 3-D boolean volume selecting the voxels of interest, typically the
/// brain tissue as produced by an external skull stripping tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskVolume {
    data: Array3<bool>,
}

impl MaskVolume {
    /// Wrap an existing boolean array with axes `(x, y, z)`.
    pub fn new(data: Array3<bool>) -> Self {
        MaskVolume { data }
    }

    /// Create a mask from an array of any supported mask element type.
    /// Non-zero values are selected.
    ///
    /// # Example
    ///
    /// ```
    /// # use fmriqc::MaskVolume;
    /// use ndarray::array;
    ///
    /// let raw = array![[[0_u8, 1], [1, 0]]];
    /// let mask = MaskVolume::from_elements(raw.view());
    /// assert_eq!(mask.count(), 2);
    /// ```
    pub fn from_elements<T>(data: ArrayView3<T>) -> Self
    where
        T: MaskElement,
    {
        MaskVolume {
            data: data.mapv(MaskElement::is_selected),
        }
    }

    /// The spatial extent of the mask.
    pub fn spatial_dim(&self) -> SpatialDim {
        let shape = self.data.shape();
        SpatialDim::new([shape[0], shape[1], shape[2]])
    }

    /// The number of selected voxels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|v| **v).count()
    }

    /// Whether the voxel at the given coordinate is selected. Coordinates
    /// out of bounds are never selected.
    pub fn contains(&self, coord: Coord) -> bool {
        self.data.get(coord).copied().unwrap_or(false)
    }

    /// Iterate over the selected coordinates in column-major order
    /// (`x` fastest). The position of a coordinate in this sequence is
    /// its column in a signal matrix built with this mask.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.spatial_dim()
            .index_iter()
            .filter(move |c| self.data[*c])
    }

    /// Retrieve a view of the underlying boolean array.
    pub fn data(&self) -> ArrayView3<bool> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::MaskVolume;
    use ndarray::Array3;

    #[test]
    fn coords_follow_column_major_order() {
        let mut data = Array3::from_elem((2, 2, 2), false);
        data[[1, 1, 0]] = true;
        data[[0, 0, 1]] = true;
        data[[1, 0, 0]] = true;
        let mask = MaskVolume::new(data);
        assert_eq!(mask.count(), 3);
        let coords: Vec<_> = mask.coords().collect();
        assert_eq!(coords, vec![[1, 0, 0], [1, 1, 0], [0, 0, 1]]);
        assert!(mask.contains([0, 0, 1]));
        assert!(!mask.contains([0, 0, 0]));
        assert!(!mask.contains([5, 0, 0]));
    }

    #[test]
    fn float_mask() {
        let data = Array3::from_shape_vec((3, 1, 1), vec![0.0_f32, 1.0, f32::NAN]).unwrap();
        let mask = MaskVolume::from_elements(data.view());
        assert_eq!(mask.coords().collect::<Vec<_>>(), vec![[1, 0, 0]]);
    }
}
