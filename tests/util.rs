use fmriqc::{MaskVolume, MotionParameterTable, Volume4D};
use ndarray::{Array3, Array4};

/// A 2x2x1 volume of 3 frames where voxel (0, 0, 0) has intensities
/// [1, 3, 2] over time, and a mask selecting only that voxel.
#[allow(dead_code)]
pub fn single_voxel_scenario() -> (Volume4D, MaskVolume) {
    let mut data = Array4::from_elem((2, 2, 1, 3), 100.);
    for (t, v) in [1., 3., 2.].iter().enumerate() {
        data[[0, 0, 0, t]] = *v;
    }
    let mut mask = Array3::from_elem((2, 2, 1), false);
    mask[[0, 0, 0]] = true;
    (Volume4D::new(data), MaskVolume::new(mask))
}

/// A deterministic, non-trivial volume of the given shape.
#[allow(dead_code)]
pub fn ramp_volume(shape: (usize, usize, usize, usize), seed: f64) -> Volume4D {
    Volume4D::new(Array4::from_shape_fn(shape, |(x, y, z, t)| {
        ((x * 31 + y * 17 + z * 7) as f64 + seed * (t as f64 + 1.)).sin() * 100. + 500.
    }))
}

/// A mask selecting every other voxel of the given shape, plus the origin.
#[allow(dead_code)]
pub fn checkerboard_mask(shape: (usize, usize, usize)) -> MaskVolume {
    MaskVolume::new(Array3::from_shape_fn(shape, |(x, y, z)| (x + y + z) % 2 == 0))
}

/// The two-row motion table with a 0.02 rad rotation and 1 mm translation.
#[allow(dead_code)]
pub fn two_row_motion() -> MotionParameterTable {
    MotionParameterTable::from_rows(&[
        [0., 0., 0., 0., 0., 0.],
        [0.02, 0., 0., 1., 0., 0.],
    ])
    .unwrap()
}
