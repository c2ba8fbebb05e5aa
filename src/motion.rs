//! Module for handling rigid-body motion parameter tables.
//!
//! Motion correction tools report, for each time point, three rotations
//! (in radians) followed by three translations (in millimeters) describing
//! the estimated head position relative to a reference frame. The usual
//! on-disk form is plain text with one whitespace-separated row of six
//! numbers per time point.

use std::io::BufRead;
use std::path::Path;

use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

use crate::error::{QcError, Result};
use crate::metrics::{compute_fd, FdSeries, MOTION_COLUMNS};
use crate::util::open_maybe_gz;

/// A `T x 6` table of motion parameters in acquisition order.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionParameterTable {
    data: Array2<f64>,
}

impl MotionParameterTable {
    /// Validate and wrap an existing `T x 6` array.
    ///
    /// # Errors
    ///
    /// - `QcError::InvalidShape` if the array does not have exactly 6 columns.
    /// - `QcError::EmptyInput` if the array has no rows.
    pub fn new(data: Array2<f64>) -> Result<Self> {
        if data.ncols() != MOTION_COLUMNS {
            return Err(QcError::InvalidShape(data.ncols()));
        }
        if data.nrows() == 0 {
            return Err(QcError::EmptyInput);
        }
        Ok(MotionParameterTable { data })
    }

    /// Create a table from rows of `[rx, ry, rz, tx, ty, tz]`.
    ///
    /// # Errors
    ///
    /// - `QcError::EmptyInput` if no rows are given.
    pub fn from_rows(rows: &[[f64; MOTION_COLUMNS]]) -> Result<Self> {
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        let data = Array2::from_shape_vec((rows.len(), MOTION_COLUMNS), flat)
            .map_err(|_| QcError::InvalidShape(MOTION_COLUMNS))?;
        MotionParameterTable::new(data)
    }

    /// Read a motion parameter table from a file. If the file's name ends
    /// with ".gz", it is decoded as a Gzip stream.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fmriqc::MotionParameterTable;
    ///
    /// let motion = MotionParameterTable::from_file("func_mcf.par")?;
    /// let fd = motion.framewise_displacement(50.)?;
    /// # Ok::<(), fmriqc::QcError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = Self::from_reader(open_maybe_gz(&path)?)?;
        debug!(path = %path.as_ref().display(), rows = table.n_timepoints(), "read motion parameters");
        Ok(table)
    }

    /// Read a motion parameter table from a text stream.
    ///
    /// Each non-blank line holds exactly six whitespace-separated numbers.
    /// Blank lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// - `QcError::MalformedMotionLine` if a line is not valid UTF-8, has a
    ///   token which is not a finite number, or does not have six tokens.
    ///   Line numbers start at 1.
    /// - `QcError::EmptyInput` if the stream has no rows.
    /// - `QcError::Io` on read failure.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut flat = Vec::new();
        let mut n_rows = 0;
        for (i, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let line = std::str::from_utf8(&line)
                .map_err(|_| QcError::MalformedMotionLine(i + 1, "not valid UTF-8".to_string()))?
                .trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = parse_row(line).map_err(|reason| QcError::MalformedMotionLine(i + 1, reason))?;
            flat.extend_from_slice(&row);
            n_rows += 1;
        }
        let data = Array2::from_shape_vec((n_rows, MOTION_COLUMNS), flat)
            .map_err(|_| QcError::InvalidShape(MOTION_COLUMNS))?;
        MotionParameterTable::new(data)
    }

    /// The number of time points (rows).
    pub fn n_timepoints(&self) -> usize {
        self.data.nrows()
    }

    /// The three rotation columns, in radians.
    pub fn rotations(&self) -> ArrayView2<f64> {
        self.data.slice(s![.., ..3])
    }

    /// The three translation columns, in millimeters.
    pub fn translations(&self) -> ArrayView2<f64> {
        self.data.slice(s![.., 3..])
    }

    /// Retrieve a view of the full table.
    pub fn as_array(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    /// Produce a new table without the first `n` rows, matching a volume
    /// whose first `n` frames were dropped.
    ///
    /// # Errors
    ///
    /// - `QcError::DropExceedsFrames` if `n` is not smaller than the number
    ///   of rows.
    pub fn drop_initial_rows(&self, n: usize) -> Result<Self> {
        let rows = self.n_timepoints();
        if n >= rows {
            return Err(QcError::DropExceedsFrames(n, rows));
        }
        Ok(MotionParameterTable {
            data: self.data.slice(s![n.., ..]).to_owned(),
        })
    }

    /// Compute the framewise displacement series of this table, with
    /// rotations converted to millimeters on a sphere of radius
    /// `rotation_to_mm`.
    pub fn framewise_displacement(&self, rotation_to_mm: f64) -> Result<FdSeries> {
        compute_fd(&self.data, rotation_to_mm)
    }
}

fn parse_row(line: &str) -> std::result::Result<[f64; MOTION_COLUMNS], String> {
    let mut row = [0.; MOTION_COLUMNS];
    let mut n = 0;
    for token in line.split_whitespace() {
        if n == MOTION_COLUMNS {
            return Err(format!("more than {} values", MOTION_COLUMNS));
        }
        let value: f64 = token
            .parse()
            .map_err(|_| format!("`{}` is not a number", token))?;
        if !value.is_finite() {
            return Err(format!("`{}` is not a finite number", token));
        }
        row[n] = value;
        n += 1;
    }
    if n != MOTION_COLUMNS {
        return Err(format!("expected {} values, found {}", MOTION_COLUMNS, n));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::MotionParameterTable;
    use crate::error::QcError;
    use ndarray::{array, Array2};

    #[test]
    fn parse_text() {
        let text = "# rx ry rz tx ty tz\n\
                    0 0 0 0 0 0\n\
                    \n\
                    \t0.02  0 0   1 0 0  \n\
                    -1e-3 0 0 0 0 2.5\n";
        let motion = MotionParameterTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(motion.n_timepoints(), 3);
        assert_eq!(motion.rotations()[[1, 0]], 0.02);
        assert_eq!(motion.translations()[[2, 2]], 2.5);
        assert_eq!(motion.rotations()[[2, 0]], -0.001);
    }

    #[test]
    fn malformed_lines() {
        let text = "0 0 0 0 0 0\n0 0 0 0 0\n";
        match MotionParameterTable::from_reader(text.as_bytes()) {
            Err(QcError::MalformedMotionLine(line, reason)) => {
                assert_eq!(line, 2);
                assert!(reason.contains("found 5"), "unexpected reason: {}", reason);
            }
            other => panic!("unexpected result {:?}", other),
        }

        let text = "0 0 0 0 0 0 0\n";
        assert!(matches!(
            MotionParameterTable::from_reader(text.as_bytes()),
            Err(QcError::MalformedMotionLine(1, _))
        ));

        for text in &["nan 0 0 0 0 0\n", "0 0 0 inf 0 0\n", "0 0 0 0 -Infinity 0\n"] {
            match MotionParameterTable::from_reader(text.as_bytes()) {
                Err(QcError::MalformedMotionLine(1, reason)) => {
                    assert!(reason.contains("finite"), "unexpected reason: {}", reason);
                }
                other => panic!("unexpected result {:?}", other),
            }
        }

        let text = "0 0 zero 0 0 0\n";
        assert!(matches!(
            MotionParameterTable::from_reader(text.as_bytes()),
            Err(QcError::MalformedMotionLine(1, _))
        ));

        assert!(matches!(
            MotionParameterTable::from_reader("# nothing\n\n".as_bytes()),
            Err(QcError::EmptyInput)
        ));
    }

    #[test]
    fn shape_validation() {
        assert!(matches!(
            MotionParameterTable::new(Array2::zeros((5, 3))),
            Err(QcError::InvalidShape(3))
        ));
        assert!(matches!(
            MotionParameterTable::new(Array2::zeros((0, 6))),
            Err(QcError::EmptyInput)
        ));
        assert!(matches!(
            MotionParameterTable::from_rows(&[]),
            Err(QcError::EmptyInput)
        ));
    }

    #[test]
    fn drop_rows() {
        let motion = MotionParameterTable::from_rows(&[
            [0., 0., 0., 0., 0., 0.],
            [0., 0., 0., 1., 0., 0.],
            [0., 0., 0., 3., 0., 0.],
        ])
        .unwrap();
        let trimmed = motion.drop_initial_rows(1).unwrap();
        assert_eq!(trimmed.n_timepoints(), 2);
        assert_eq!(trimmed.framewise_displacement(50.).unwrap(), array![0., 2.]);
        assert!(matches!(
            motion.drop_initial_rows(3),
            Err(QcError::DropExceedsFrames(3, 3))
        ));
    }
}
