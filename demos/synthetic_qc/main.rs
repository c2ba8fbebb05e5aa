//! An application which builds a synthetic functional run with a simulated
//! head movement, computes its QC report and writes it as TSV.
//!
//! Usage: `synthetic_qc [output.tsv[.gz]]`

extern crate fmriqc;
extern crate ndarray;

use std::env;
use std::io;

use fmriqc::{MaskVolume, MotionParameterTable, QcOptions, QcReport, Volume4D};
use ndarray::{Array2, Array3, Array4};

const DIM: (usize, usize, usize) = (16, 16, 8);
const FRAMES: usize = 40;
const SPIKE: usize = 25;

fn main() {
    tracing_subscriber::fmt::init();

    let (nx, ny, nz) = DIM;
    let centre = [nx as f64 / 2., ny as f64 / 2., nz as f64 / 2.];
    let inside = |x: usize, y: usize, z: usize| {
        let d = [
            (x as f64 - centre[0]) / centre[0],
            (y as f64 - centre[1]) / centre[1],
            (z as f64 - centre[2]) / centre[2],
        ];
        d.iter().map(|v| v * v).sum::<f64>() < 0.8
    };

    // a slowly drifting ellipsoid with an intensity jump at the spike frame
    let volume = Volume4D::new(Array4::from_shape_fn(
        (nx, ny, nz, FRAMES),
        |(x, y, z, t)| {
            let base = if inside(x, y, z) { 800. } else { 20. };
            let drift = t as f64 * 0.5;
            let spike = if t == SPIKE { 40. } else { 0. };
            base + drift + spike + ((x * 7 + y * 3 + z + t * 11) % 13) as f64
        },
    ));
    let mask = MaskVolume::new(Array3::from_shape_fn(DIM, |(x, y, z)| inside(x, y, z)));

    let mut motion = Array2::zeros((FRAMES, 6));
    for t in SPIKE..FRAMES {
        motion[[t, 0]] = 0.01;
        motion[[t, 3]] = 0.4;
    }
    let motion = MotionParameterTable::new(motion).expect("Invalid motion table");

    let options = QcOptions::new().with_drop_initial(2).with_dvars_threshold(Some(20.));
    let report =
        QcReport::compute(&volume, &mask, &motion, &options).expect("Failed to compute QC report");

    match env::args().nth(1) {
        Some(path) => report.write_tsv_file(path).expect("Failed to write report"),
        None => report
            .write_tsv(&mut io::stdout())
            .expect("Failed to write report"),
    }
    eprintln!("{:#?}", report.summary());
}
