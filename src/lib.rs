//! Quality control metrics for functional MRI time series.
//!
//! This crate extracts a time-by-voxel signal matrix from a motion-corrected
//! 4-D volume and a brain mask, and derives two per-frame quality series:
//!
//! - **DVARS**, the root-mean-square intensity change across voxels between
//!   consecutive frames;
//! - **framewise displacement (FD)**, the summed absolute rigid-body motion
//!   between consecutive frames, from a table of six motion parameters.
//!
//! Registration, motion estimation and skull stripping are performed by
//! external tools. This crate only consumes their outputs, already loaded
//! in memory as `ndarray` arrays (or, for motion parameters, as plain text).
//!
//! # Example
//!
//! ```
//! use fmriqc::{build, MaskVolume, MotionParameterTable, QcOptions, QcReport, Volume4D};
//! use ndarray::{Array3, Array4};
//!
//! let volume = Volume4D::new(Array4::from_shape_fn((4, 4, 2, 3), |(x, _, _, t)| {
//!     (x * t) as f64
//! }));
//! let mask = MaskVolume::new(Array3::from_elem((4, 4, 2), true));
//!
//! let matrix = build(&volume, &mask)?;
//! assert_eq!(matrix.values().dim(), (3, 32));
//! assert_eq!(matrix.dvars()?[0], 0.);
//!
//! let motion = MotionParameterTable::from_rows(&[[0.; 6], [0.; 6], [0.; 6]])?;
//! let report = QcReport::compute(&volume, &mask, &motion, &QcOptions::default())?;
//! assert!(report.flagged_frames().is_empty());
//! # Ok::<(), fmriqc::QcError>(())
//! ```
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;

pub mod cache;
pub mod error;
pub mod matrix;
pub mod metrics;
pub mod motion;
pub mod report;
pub mod volume;
mod util;

pub use crate::error::{QcError, Result};
pub use crate::matrix::{build, SignalMatrix};
pub use crate::metrics::{
    compute_dvars, compute_dvars_with, compute_fd, DvarsSeries, FdSeries, FirstFrame,
    DEFAULT_HEAD_RADIUS_MM, MOTION_COLUMNS,
};
pub use crate::motion::MotionParameterTable;
pub use crate::report::{QcOptions, QcReport, QcSummary, DEFAULT_FD_THRESHOLD_MM};
pub use crate::volume::{MaskVolume, SpatialDim, Volume4D};
