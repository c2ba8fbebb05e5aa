//! This module defines the in-memory volume types consumed by the
//! signal matrix builder: a 4-D intensity series and a 3-D binary mask.
//!
//! Reading these volumes from disk is left to the caller. A typical source
//! is a motion-corrected series written by an external registration tool,
//! loaded into an `ndarray` with axes `(x, y, z, t)`.

pub mod element;
pub mod mask;
pub mod shape;

pub use self::element::{MaskElement, VoxelElement};
pub use self::mask::MaskVolume;
pub use self::shape::{Coord, DimIter, SpatialDim};

use crate::error::{QcError, Result};
use ndarray::{s, Array3, Array4, ArrayView3, ArrayView4, Axis};

/// A series of 3-D frames, stored as a 4-D array indexed by `(x, y, z, t)`
/// with the last axis in acquisition order.
///
/// All frames share the same spatial dimensions by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume4D {
    data: Array4<f64>,
}

impl Volume4D {
    /// Wrap an existing array with axes `(x, y, z, t)`.
    pub fn new(data: Array4<f64>) -> Self {
        Volume4D { data }
    }

    /// Create a volume from an array of any supported voxel type, converting
    /// each intensity to double precision.
    ///
    /// # Example
    ///
    /// ```
    /// # use fmriqc::Volume4D;
    /// use ndarray::Array4;
    ///
    /// let raw = Array4::<i16>::from_elem((4, 4, 2, 10), 100);
    /// let volume = Volume4D::from_elements(raw.view());
    /// assert_eq!(volume.n_frames(), 10);
    /// assert_eq!(volume.spatial_dim().raw(), [4, 4, 2]);
    /// ```
    pub fn from_elements<T>(data: ArrayView4<T>) -> Self
    where
        T: VoxelElement,
    {
        Volume4D {
            data: data.mapv(VoxelElement::to_intensity),
        }
    }

    /// Assemble a volume from individual frames, in acquisition order.
    ///
    /// # Errors
    ///
    /// - `QcError::EmptyInput` if no frames are given.
    /// - `QcError::DimensionMismatch` if a frame's shape differs from the
    ///   first frame's shape.
    pub fn from_frames(frames: Vec<Array3<f64>>) -> Result<Self> {
        let first = frames.first().ok_or(QcError::EmptyInput)?;
        let expected = shape3(first.shape());
        for frame in &frames {
            let got = shape3(frame.shape());
            if got != expected {
                return Err(QcError::DimensionMismatch(expected, got));
            }
        }
        let [nx, ny, nz] = expected;
        let mut data = Array4::zeros((nx, ny, nz, frames.len()));
        for (mut slot, frame) in data.axis_iter_mut(Axis(3)).zip(&frames) {
            slot.assign(frame);
        }
        Ok(Volume4D { data })
    }

    /// The spatial extent shared by every frame.
    pub fn spatial_dim(&self) -> SpatialDim {
        SpatialDim::new(shape3(self.data.shape()))
    }

    /// The number of time points (frames).
    pub fn n_frames(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    /// Obtain a view of the frame at time index `t`, or `None` if out of
    /// bounds.
    pub fn frame(&self, t: usize) -> Option<ArrayView3<f64>> {
        if t < self.n_frames() {
            Some(self.data.index_axis(Axis(3), t))
        } else {
            None
        }
    }

    /// Retrieve a view of the full 4-D array.
    pub fn data(&self) -> ArrayView4<f64> {
        self.data.view()
    }

    /// Consume the volume, retrieving the underlying array.
    pub fn into_data(self) -> Array4<f64> {
        self.data
    }

    /// Produce a new volume without the first `n` frames, as done to
    /// discard frames acquired before the signal reached steady state.
    ///
    /// # Errors
    ///
    /// - `QcError::DropExceedsFrames` if `n` is not smaller than the number
    ///   of frames.
    pub fn drop_initial_frames(&self, n: usize) -> Result<Self> {
        let frames = self.n_frames();
        if n >= frames {
            return Err(QcError::DropExceedsFrames(n, frames));
        }
        Ok(Volume4D {
            data: self.data.slice(s![.., .., .., n..]).to_owned(),
        })
    }
}

fn shape3(shape: &[usize]) -> [usize; 3] {
    [shape[0], shape[1], shape[2]]
}
