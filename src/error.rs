//! Types for error handling go here.
use std::io::Error as IOError;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum QcError {
        /// The spatial shape of one volume disagrees with another
        /// (a mask and a 4-D volume, or two frames of the same series).
        DimensionMismatch(expected: [usize; 3], got: [usize; 3]) {
            display("Spatial dimensions {:?} do not match expected {:?}", got, expected)
        }
        /// The mask does not select any voxel.
        EmptyMask {
            display("Mask does not select any voxel")
        }
        /// A motion parameter table does not have exactly 6 columns.
        InvalidShape(columns: usize) {
            display("Motion parameter table has {} columns, expected 6", columns)
        }
        /// No time points were supplied.
        EmptyInput {
            display("Input has no time points")
        }
        /// A signal matrix without voxel columns was given.
        NoVoxelColumns {
            display("Signal matrix has no voxel columns")
        }
        /// The volume and the motion parameter table disagree on the
        /// number of time points.
        FrameCountMismatch(volume_frames: usize, motion_rows: usize) {
            display("Volume has {} frames but motion table has {} rows",
                    volume_frames, motion_rows)
        }
        /// Attempted to drop as many or more leading frames than available.
        DropExceedsFrames(drop: usize, frames: usize) {
            display("Cannot drop {} initial frames out of {}", drop, frames)
        }
        /// A line of a motion parameter file could not be parsed.
        MalformedMotionLine(line: usize, reason: String) {
            display("Malformed motion parameter line {}: {}", line, reason)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, QcError>;
