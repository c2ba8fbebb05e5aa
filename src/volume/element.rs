//! This module defines the element API, which enables volumes of
//! arbitrary primitive types to be brought into the double precision
//! representation used by the quality metrics, and masks of arbitrary
//! types to be interpreted as boolean.
use num_traits::cast::AsPrimitive;

/// Trait type for characterizing a voxel intensity element, implemented for
/// primitive numeric types in which imaging data is usually stored.
///
/// Conversion to `f64` is lossless for all implementors except 64-bit
/// integers beyond 2^53 in magnitude.
pub trait VoxelElement: 'static + Sized + Copy + AsPrimitive<f64> {
    /// Convert this element into the double precision intensity.
    fn to_intensity(self) -> f64 {
        self.as_()
    }
}

impl VoxelElement for u8 {}
impl VoxelElement for i8 {}
impl VoxelElement for u16 {}
impl VoxelElement for i16 {}
impl VoxelElement for u32 {}
impl VoxelElement for i32 {}
impl VoxelElement for u64 {}
impl VoxelElement for i64 {}
impl VoxelElement for f32 {}
impl VoxelElement for f64 {}

/// Trait type for elements of a mask volume.
///
/// Masks produced by external tools are commonly stored as zero/one
/// integers or floats, so any non-zero value marks a voxel as selected.
/// A `NaN` is not selected.
pub trait MaskElement: 'static + Copy {
    /// Whether this element marks the voxel as part of the mask.
    fn is_selected(self) -> bool;
}

impl MaskElement for bool {
    fn is_selected(self) -> bool {
        self
    }
}

macro_rules! impl_mask_element_int {
    ($($t:ty),*) => {
        $(
            impl MaskElement for $t {
                fn is_selected(self) -> bool {
                    self != 0
                }
            }
        )*
    };
}

macro_rules! impl_mask_element_float {
    ($($t:ty),*) => {
        $(
            impl MaskElement for $t {
                fn is_selected(self) -> bool {
                    // NaN is never selected
                    !self.is_nan() && self != 0.
                }
            }
        )*
    };
}

impl_mask_element_int!(u8, i8, u16, i16, u32, i32, u64, i64);
impl_mask_element_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::{MaskElement, VoxelElement};

    #[test]
    fn intensities() {
        assert_eq!(200_u8.to_intensity(), 200.);
        assert_eq!((-1024_i16).to_intensity(), -1024.);
        assert_eq!(0.5_f32.to_intensity(), 0.5);
    }

    #[test]
    fn mask_elements() {
        assert!(true.is_selected());
        assert!(!false.is_selected());
        assert!(1_u8.is_selected());
        assert!(!0_u8.is_selected());
        assert!((-1_i16).is_selected());
        assert!(0.25_f32.is_selected());
        assert!(!0_f64.is_selected());
        assert!(!(-0_f64).is_selected());
        assert!(!f32::NAN.is_selected());
    }
}
