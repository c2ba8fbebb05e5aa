use crate::error::{QcError, Result};
use ndarray::{s, Array1, ArrayBase, Data, Ix2, Zip};
use tracing::debug;

/// A framewise displacement value per time point, in millimeters.
pub type FdSeries = Array1<f64>;

/// The number of columns of a motion parameter table: three rotations
/// (radians) followed by three translations (millimeters).
pub const MOTION_COLUMNS: usize = 6;

/// The default radius of the sphere used to convert rotations to
/// displacements on its surface, in millimeters.
pub const DEFAULT_HEAD_RADIUS_MM: f64 = 50.0;

/// Compute the framewise displacement series of a `T x 6` motion parameter
/// table.
///
/// The three rotation columns are scaled by `rotation_to_mm` (the assumed
/// head radius, so that an angle in radians becomes an arc length in
/// millimeters). For every `t >= 1`, the value is the sum of the absolute
/// differences between rows `t` and `t - 1` over all six columns. The value
/// at `t = 0` is zero.
///
/// # Errors
///
/// - `QcError::InvalidShape` if the table does not have exactly 6 columns.
/// - `QcError::EmptyInput` if the table has no rows.
///
/// # Example
///
/// ```
/// use fmriqc::{compute_fd, DEFAULT_HEAD_RADIUS_MM};
/// use ndarray::array;
///
/// let motion = array![
///     [0., 0., 0., 0., 0., 0.],
///     [0.02, 0., 0., 1., 0., 0.],
/// ];
/// let fd = compute_fd(&motion, DEFAULT_HEAD_RADIUS_MM)?;
/// assert!((fd[1] - 2.).abs() < 1e-12);
/// assert_eq!(fd[0], 0.);
/// # Ok::<(), fmriqc::QcError>(())
/// ```
pub fn compute_fd<S>(motion: &ArrayBase<S, Ix2>, rotation_to_mm: f64) -> Result<FdSeries>
where
    S: Data<Elem = f64>,
{
    let (n_rows, n_cols) = motion.dim();
    if n_cols != MOTION_COLUMNS {
        return Err(QcError::InvalidShape(n_cols));
    }
    if n_rows == 0 {
        return Err(QcError::EmptyInput);
    }

    let mut scaled = motion.to_owned();
    scaled
        .slice_mut(s![.., ..3])
        .mapv_inplace(|r| r * rotation_to_mm);

    let mut fd = Array1::zeros(n_rows);
    if n_rows > 1 {
        let previous = scaled.slice(s![..-1, ..]);
        let current = scaled.slice(s![1.., ..]);
        Zip::from(fd.slice_mut(s![1..]))
            .and(current.rows())
            .and(previous.rows())
            .for_each(|out, cur, prev| {
                *out = cur
                    .iter()
                    .zip(prev.iter())
                    .map(|(c, p)| (c - p).abs())
                    .sum();
            });
    }
    debug!(frames = n_rows, rotation_to_mm, "computed framewise displacement");
    Ok(fd)
}

#[cfg(test)]
mod tests {
    use super::{compute_fd, DEFAULT_HEAD_RADIUS_MM};
    use crate::error::QcError;
    use ndarray::{array, Array2};

    #[test]
    fn translations_only() {
        let motion = array![
            [0., 0., 0., 0., 0., 0.],
            [0., 0., 0., 0.5, -0.25, 0.],
            [0., 0., 0., 0.5, -0.25, 1.],
        ];
        let fd = compute_fd(&motion, DEFAULT_HEAD_RADIUS_MM).unwrap();
        assert_eq!(fd, array![0., 0.75, 1.]);
    }

    #[test]
    fn custom_head_radius() {
        let motion = array![[0., 0., 0., 0., 0., 0.], [0., 0., -0.5, 0., 0., 0.]];
        let fd = compute_fd(&motion, 80.).unwrap();
        assert_eq!(fd, array![0., 40.]);
    }

    #[test]
    fn single_row_is_zero() {
        let fd = compute_fd(&array![[0.1, 0.2, 0.3, 1., 2., 3.]], DEFAULT_HEAD_RADIUS_MM).unwrap();
        assert_eq!(fd, array![0.]);
    }

    #[test]
    fn bad_shapes() {
        let three = Array2::<f64>::zeros((4, 3));
        assert!(matches!(
            compute_fd(&three, DEFAULT_HEAD_RADIUS_MM),
            Err(QcError::InvalidShape(3))
        ));
        let empty = Array2::<f64>::zeros((0, 6));
        assert!(matches!(
            compute_fd(&empty, DEFAULT_HEAD_RADIUS_MM),
            Err(QcError::EmptyInput)
        ));
    }
}
