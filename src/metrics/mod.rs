//! Per-frame quality control metrics.
//!
//! Both metrics produce one non-negative value per time point, index-aligned
//! with their input rows. The first time point has no preceding frame to
//! difference against, so its value is zero:
//!
//! - [`compute_dvars`] measures the root-mean-square intensity change across
//!   voxels between consecutive frames of a signal matrix.
//! - [`compute_fd`] sums the absolute rigid-body motion between consecutive
//!   rows of a motion parameter table, with rotations converted to
//!   millimeters on a sphere of a given radius.
//!
//! [`compute_dvars`]: ./fn.compute_dvars.html
//! [`compute_fd`]: ./fn.compute_fd.html

mod dvars;
mod fd;

pub use self::dvars::{compute_dvars, compute_dvars_with, DvarsSeries, FirstFrame};
pub use self::fd::{compute_fd, FdSeries, DEFAULT_HEAD_RADIUS_MM, MOTION_COLUMNS};
