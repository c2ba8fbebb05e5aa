//! Quality control report over a single functional run.
//!
//! This module composes the signal matrix builder and both metrics into one
//! call, after the optional removal of initial frames, and adds the frame
//! flagging and summary figures that are usually inspected by a human
//! operator.

use std::io::Write;
use std::path::Path;

use ndarray::{Array1, ArrayView1, Zip};
use tracing::{info, warn};

use crate::error::{QcError, Result};
use crate::matrix::build;
use crate::metrics::{compute_dvars_with, DvarsSeries, FdSeries, FirstFrame, DEFAULT_HEAD_RADIUS_MM};
use crate::motion::MotionParameterTable;
use crate::util::write_maybe_gz;
use crate::volume::{MaskVolume, Volume4D};

/// The default framewise displacement above which a frame is flagged, in
/// millimeters.
pub const DEFAULT_FD_THRESHOLD_MM: f64 = 0.5;

/// Options for computing a [`QcReport`](./struct.QcReport.html).
///
/// # Example
///
/// ```
/// use fmriqc::{FirstFrame, QcOptions};
///
/// let options = QcOptions::new()
///     .with_drop_initial(4)
///     .with_rotation_to_mm(80.)
///     .with_dvars_threshold(Some(30.));
/// assert_eq!(options.first_frame, FirstFrame::Zero);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QcOptions {
    /// Number of leading frames to discard from both the volume and the
    /// motion table.
    pub drop_initial: usize,
    /// Head radius in millimeters used to convert rotations.
    pub rotation_to_mm: f64,
    /// Convention for the first DVARS value.
    pub first_frame: FirstFrame,
    /// Whether to z-score every voxel's time series before computing DVARS.
    pub standardize: bool,
    /// Framewise displacement above which a frame is flagged.
    pub fd_threshold: f64,
    /// DVARS above which a frame is flagged, if any.
    pub dvars_threshold: Option<f64>,
}

impl Default for QcOptions {
    fn default() -> Self {
        QcOptions {
            drop_initial: 0,
            rotation_to_mm: DEFAULT_HEAD_RADIUS_MM,
            first_frame: FirstFrame::Zero,
            standardize: false,
            fd_threshold: DEFAULT_FD_THRESHOLD_MM,
            dvars_threshold: None,
        }
    }
}

impl QcOptions {
    /// Create a new set of options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the first `n` frames.
    pub fn with_drop_initial(mut self, n: usize) -> Self {
        self.drop_initial = n;
        self
    }

    /// Set the head radius used to convert rotations to millimeters.
    pub fn with_rotation_to_mm(mut self, radius: f64) -> Self {
        self.rotation_to_mm = radius;
        self
    }

    /// Set the convention for the first DVARS value.
    pub fn with_first_frame(mut self, first_frame: FirstFrame) -> Self {
        self.first_frame = first_frame;
        self
    }

    /// Enable or disable z-scoring before DVARS.
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    /// Set the framewise displacement threshold.
    pub fn with_fd_threshold(mut self, threshold: f64) -> Self {
        self.fd_threshold = threshold;
        self
    }

    /// Set or clear the DVARS threshold.
    pub fn with_dvars_threshold(mut self, threshold: Option<f64>) -> Self {
        self.dvars_threshold = threshold;
        self
    }
}

/// Summary figures of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct QcSummary {
    /// Number of frames in the report.
    pub frames: usize,
    /// Mean framewise displacement.
    pub mean_fd: f64,
    /// Maximum framewise displacement.
    pub max_fd: f64,
    /// Mean DVARS.
    pub mean_dvars: f64,
    /// Maximum DVARS.
    pub max_dvars: f64,
    /// Number of flagged frames.
    pub flagged: usize,
}

/// DVARS and framewise displacement of one run, index-aligned by frame.
#[derive(Debug, Clone, PartialEq)]
pub struct QcReport {
    dvars: DvarsSeries,
    fd: FdSeries,
    fd_threshold: f64,
    dvars_threshold: Option<f64>,
}

impl QcReport {
    /// Compute the report of a motion-corrected volume, its brain mask and
    /// the motion parameters estimated during motion correction.
    ///
    /// # Errors
    ///
    /// - `QcError::DropExceedsFrames` if `options.drop_initial` leaves no
    ///   frame.
    /// - `QcError::FrameCountMismatch` if the volume and motion table
    ///   disagree on the number of time points.
    /// - Any error of [`build`](../matrix/fn.build.html) or the metrics.
    pub fn compute(
        volume: &Volume4D,
        mask: &MaskVolume,
        motion: &MotionParameterTable,
        options: &QcOptions,
    ) -> Result<Self> {
        if volume.n_frames() != motion.n_timepoints() {
            return Err(QcError::FrameCountMismatch(
                volume.n_frames(),
                motion.n_timepoints(),
            ));
        }
        let trimmed;
        let (volume, motion) = if options.drop_initial > 0 {
            trimmed = (
                volume.drop_initial_frames(options.drop_initial)?,
                motion.drop_initial_rows(options.drop_initial)?,
            );
            (&trimmed.0, &trimmed.1)
        } else {
            (volume, motion)
        };

        let matrix = build(volume, mask)?;
        let matrix = if options.standardize {
            matrix.standardized()
        } else {
            matrix
        };
        let dvars = compute_dvars_with(&matrix.values(), options.first_frame)?;
        let fd = motion.framewise_displacement(options.rotation_to_mm)?;

        let report = QcReport::from_series(dvars, fd, options)?;
        let summary = report.summary();
        info!(
            frames = summary.frames,
            voxels = matrix.n_voxels(),
            mean_fd = summary.mean_fd,
            max_dvars = summary.max_dvars,
            "QC report computed"
        );
        if summary.flagged > 0 {
            warn!(flagged = summary.flagged, "frames exceed QC thresholds");
        }
        Ok(report)
    }

    /// Assemble a report from precomputed series.
    ///
    /// # Errors
    ///
    /// - `QcError::EmptyInput` if the series are empty.
    /// - `QcError::FrameCountMismatch` if the series differ in length.
    pub fn from_series(dvars: DvarsSeries, fd: FdSeries, options: &QcOptions) -> Result<Self> {
        if dvars.len() != fd.len() {
            return Err(QcError::FrameCountMismatch(dvars.len(), fd.len()));
        }
        if dvars.is_empty() {
            return Err(QcError::EmptyInput);
        }
        Ok(QcReport {
            dvars,
            fd,
            fd_threshold: options.fd_threshold,
            dvars_threshold: options.dvars_threshold,
        })
    }

    /// The number of frames.
    pub fn n_frames(&self) -> usize {
        self.dvars.len()
    }

    /// The DVARS series.
    pub fn dvars(&self) -> ArrayView1<f64> {
        self.dvars.view()
    }

    /// The framewise displacement series.
    pub fn fd(&self) -> ArrayView1<f64> {
        self.fd.view()
    }

    /// Whether each frame exceeds the framewise displacement threshold or,
    /// if set, the DVARS threshold. A frame with a non-finite value is
    /// always flagged.
    pub fn flags(&self) -> Vec<bool> {
        let mut flags = Array1::from_elem(self.n_frames(), false);
        Zip::from(&mut flags)
            .and(&self.fd)
            .and(&self.dvars)
            .for_each(|flag, fd, dvars| {
                *flag = !fd.is_finite()
                    || !dvars.is_finite()
                    || *fd > self.fd_threshold
                    || self.dvars_threshold.map_or(false, |t| *dvars > t);
            });
        flags.to_vec()
    }

    /// The indices of flagged frames, ascending.
    pub fn flagged_frames(&self) -> Vec<usize> {
        self.flags()
            .into_iter()
            .enumerate()
            .filter(|(_, f)| *f)
            .map(|(i, _)| i)
            .collect()
    }

    /// Compute the summary figures of this report.
    pub fn summary(&self) -> QcSummary {
        QcSummary {
            frames: self.n_frames(),
            mean_fd: self.fd.mean().unwrap_or(0.),
            max_fd: self.fd.fold(0., |a: f64, b| a.max(*b)),
            mean_dvars: self.dvars.mean().unwrap_or(0.),
            max_dvars: self.dvars.fold(0., |a: f64, b| a.max(*b)),
            flagged: self.flagged_frames().len(),
        }
    }

    /// Write the report as tab-separated values, with a header line
    /// `frame dvars fd flagged` and one line per frame.
    pub fn write_tsv<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "frame\tdvars\tfd\tflagged")?;
        for (i, flag) in self.flags().into_iter().enumerate() {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                i,
                self.dvars[i],
                self.fd[i],
                if flag { 1 } else { 0 }
            )?;
        }
        Ok(())
    }

    /// Write the report as tab-separated values to a file. If the file's
    /// name ends with ".gz", the output is Gzip compressed.
    pub fn write_tsv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_maybe_gz(path, |w| self.write_tsv(w))
    }
}
