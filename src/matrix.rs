//! Extraction of the time-by-voxel signal matrix.
//!
//! A [`SignalMatrix`] holds one row per time point (in acquisition order)
//! and one column per voxel selected by a mask. Columns are assigned by the
//! column-major rank of each selected voxel, as enumerated by
//! [`MaskVolume::coords`], so the same mask always yields the same column
//! layout regardless of the volume contents.
//!
//! [`SignalMatrix`]: ./struct.SignalMatrix.html
//! [`MaskVolume::coords`]: ../volume/mask/struct.MaskVolume.html#method.coords

use crate::error::{QcError, Result};
use crate::metrics::{self, DvarsSeries, FirstFrame};
use crate::volume::{Coord, MaskVolume, SpatialDim, Volume4D};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut1, Axis};
use tracing::debug;

/// A 2-D matrix of `T` time points by `V` masked voxels.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    values: Array2<f64>,
    dim: SpatialDim,
    /// column-major rank of the voxel behind each column, ascending
    ranks: Vec<usize>,
}

/// Build the signal matrix of `volume` restricted to the voxels of `mask`.
///
/// Row `t` holds the intensities of frame `t`; column `v` holds the voxel
/// of rank `v` among the selected coordinates.
///
/// # Errors
///
/// - `QcError::DimensionMismatch` if the volume's spatial shape is not
///   exactly the mask's shape.
/// - `QcError::EmptyMask` if the mask selects no voxel.
///
/// # Example
///
/// ```
/// use fmriqc::{build, MaskVolume, Volume4D};
/// use ndarray::{array, Array3, Array4};
///
/// let mut data = Array4::zeros((2, 2, 1, 3));
/// for (t, v) in [1., 3., 2.].iter().enumerate() {
///     data[[0, 0, 0, t]] = *v;
/// }
/// let mut mask = Array3::from_elem((2, 2, 1), false);
/// mask[[0, 0, 0]] = true;
///
/// let matrix = build(&Volume4D::new(data), &MaskVolume::new(mask))?;
/// assert_eq!(matrix.values(), array![[1.], [3.], [2.]]);
/// # Ok::<(), fmriqc::QcError>(())
/// ```
pub fn build(volume: &Volume4D, mask: &MaskVolume) -> Result<SignalMatrix> {
    let dim = mask.spatial_dim();
    let volume_dim = volume.spatial_dim();
    if volume_dim != dim {
        return Err(QcError::DimensionMismatch(dim.raw(), volume_dim.raw()));
    }

    let coords: Vec<Coord> = mask.coords().collect();
    if coords.is_empty() {
        return Err(QcError::EmptyMask);
    }

    let n_frames = volume.n_frames();
    let mut values = Array2::zeros((n_frames, coords.len()));
    fill_rows(&mut values, volume, &coords);

    let ranks = coords
        .iter()
        .filter_map(|c| dim.linear_index(*c))
        .collect();
    debug!(frames = n_frames, voxels = coords.len(), "signal matrix built");

    Ok(SignalMatrix { values, dim, ranks })
}

#[cfg(not(feature = "parallel"))]
fn fill_rows(values: &mut Array2<f64>, volume: &Volume4D, coords: &[Coord]) {
    let data = volume.data();
    for (mut row, frame) in values.axis_iter_mut(Axis(0)).zip(data.axis_iter(Axis(3))) {
        fill_row(&mut row, &frame, coords);
    }
}

#[cfg(feature = "parallel")]
fn fill_rows(values: &mut Array2<f64>, volume: &Volume4D, coords: &[Coord]) {
    use rayon::prelude::*;

    let data = volume.data();
    values
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(data.axis_iter(Axis(3)).into_par_iter())
        .for_each(|(mut row, frame)| fill_row(&mut row, &frame, coords));
}

fn fill_row(row: &mut ArrayViewMut1<f64>, frame: &ArrayView3<f64>, coords: &[Coord]) {
    for (out, c) in row.iter_mut().zip(coords) {
        *out = frame[*c];
    }
}

impl SignalMatrix {
    /// The number of time points (rows).
    pub fn n_timepoints(&self) -> usize {
        self.values.nrows()
    }

    /// The number of masked voxels (columns).
    pub fn n_voxels(&self) -> usize {
        self.values.ncols()
    }

    /// Retrieve a view of the matrix values.
    pub fn values(&self) -> ArrayView2<f64> {
        self.values.view()
    }

    /// Consume the matrix, retrieving its values.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Retrieve the time series of a single column.
    pub fn column(&self, column: usize) -> Option<ArrayView1<f64>> {
        if column < self.n_voxels() {
            Some(self.values.column(column))
        } else {
            None
        }
    }

    /// The spatial extent of the volume this matrix was built from.
    pub fn spatial_dim(&self) -> SpatialDim {
        self.dim
    }

    /// The spatial coordinate of the voxel behind the given column.
    pub fn coord_of(&self, column: usize) -> Option<Coord> {
        self.ranks
            .get(column)
            .and_then(|rank| self.dim.coord_of(*rank))
    }

    /// The column holding the given voxel, or `None` if the voxel was not
    /// selected by the mask.
    pub fn column_of(&self, coord: Coord) -> Option<usize> {
        let rank = self.dim.linear_index(coord)?;
        self.ranks.binary_search(&rank).ok()
    }

    /// Produce a copy of this matrix with every column z-scored over time
    /// (zero mean, unit population standard deviation). Columns with no
    /// temporal variance become all zeros.
    ///
    /// DVARS of the standardized matrix is the z-scored DVARS variant.
    pub fn standardized(&self) -> SignalMatrix {
        let mut values = self.values.clone();
        for mut column in values.axis_iter_mut(Axis(1)) {
            let mean = column.mean().unwrap_or(0.);
            let std = column.std(0.);
            if std > 0. {
                column.mapv_inplace(|v| (v - mean) / std);
            } else {
                column.fill(0.);
            }
        }
        SignalMatrix {
            values,
            dim: self.dim,
            ranks: self.ranks.clone(),
        }
    }

    /// Compute the DVARS series of this matrix, with the first frame set to
    /// zero.
    pub fn dvars(&self) -> Result<DvarsSeries> {
        metrics::compute_dvars(&self.values)
    }

    /// Compute the DVARS series of this matrix with the given first frame
    /// convention.
    pub fn dvars_with(&self, first_frame: FirstFrame) -> Result<DvarsSeries> {
        metrics::compute_dvars_with(&self.values, first_frame)
    }

    /// Mean intensity over all voxels, per time point. Often plotted
    /// alongside DVARS to spot global signal drifts.
    pub fn global_signal(&self) -> Array1<f64> {
        self.values
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(self.n_timepoints()))
    }
}
