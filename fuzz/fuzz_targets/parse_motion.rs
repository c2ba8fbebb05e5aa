#![no_main]
use fmriqc::{MotionParameterTable, DEFAULT_HEAD_RADIUS_MM};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(motion) = MotionParameterTable::from_reader(data) {
        let _ = motion.rotations();
        let _ = motion.drop_initial_rows(1);
        if let Ok(fd) = motion.framewise_displacement(DEFAULT_HEAD_RADIUS_MM) {
            assert_eq!(fd.len(), motion.n_timepoints());
        }
    }
});
