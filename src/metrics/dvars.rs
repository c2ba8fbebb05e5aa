use crate::error::{QcError, Result};
use ndarray::{s, Array1, ArrayBase, ArrayView1, Data, Ix2, Zip};
use tracing::debug;

/// A DVARS value per time point.
pub type DvarsSeries = Array1<f64>;

/// Convention for the DVARS value of the first frame, which has no
/// preceding frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FirstFrame {
    /// The first value is exactly zero.
    Zero,
    /// The first value is the mean of all subsequent values, as reported
    /// by some external implementations. Not equivalent to `Zero`.
    MeanOfRest,
}

impl Default for FirstFrame {
    fn default() -> Self {
        FirstFrame::Zero
    }
}

/// Compute the DVARS series of a `T x V` signal matrix.
///
/// For every `t >= 1`, the value is the root-mean-square over all columns of
/// the difference between rows `t` and `t - 1`. The value at `t = 0` is zero.
/// The matrix is used as is: z-scored DVARS requires standardizing the
/// matrix beforehand.
///
/// # Errors
///
/// - `QcError::EmptyInput` if the matrix has no rows.
/// - `QcError::NoVoxelColumns` if the matrix has no columns.
///
/// # Example
///
/// ```
/// use fmriqc::compute_dvars;
/// use ndarray::array;
///
/// let dvars = compute_dvars(&array![[1.], [3.], [2.]])?;
/// assert_eq!(dvars, array![0., 2., 1.]);
/// # Ok::<(), fmriqc::QcError>(())
/// ```
pub fn compute_dvars<S>(matrix: &ArrayBase<S, Ix2>) -> Result<DvarsSeries>
where
    S: Data<Elem = f64>,
{
    compute_dvars_with(matrix, FirstFrame::Zero)
}

/// Compute the DVARS series of a `T x V` signal matrix, with the given
/// convention for the first value.
///
/// # Errors
///
/// As in [`compute_dvars`](./fn.compute_dvars.html).
pub fn compute_dvars_with<S>(matrix: &ArrayBase<S, Ix2>, first_frame: FirstFrame) -> Result<DvarsSeries>
where
    S: Data<Elem = f64>,
{
    let (n_rows, n_cols) = matrix.dim();
    if n_rows == 0 {
        return Err(QcError::EmptyInput);
    }
    if n_cols == 0 {
        return Err(QcError::NoVoxelColumns);
    }

    let mut dvars = Array1::zeros(n_rows);
    if n_rows > 1 {
        let previous = matrix.slice(s![..-1, ..]);
        let current = matrix.slice(s![1.., ..]);
        let zip = Zip::from(dvars.slice_mut(s![1..]))
            .and(current.rows())
            .and(previous.rows());

        #[cfg(feature = "parallel")]
        zip.par_for_each(|out, cur, prev| *out = rms_difference(cur, prev));
        #[cfg(not(feature = "parallel"))]
        zip.for_each(|out, cur, prev| *out = rms_difference(cur, prev));

        if first_frame == FirstFrame::MeanOfRest {
            let rest = dvars.slice(s![1..]).mean().unwrap_or(0.);
            dvars[0] = rest;
        }
    }
    debug!(frames = n_rows, voxels = n_cols, "computed DVARS");
    Ok(dvars)
}

fn rms_difference(current: ArrayView1<f64>, previous: ArrayView1<f64>) -> f64 {
    let sum_sq: f64 = current
        .iter()
        .zip(previous.iter())
        .map(|(c, p)| {
            let d = c - p;
            d * d
        })
        .sum();
    (sum_sq / current.len() as f64).sqrt()
}
