//! An application for computing the framewise displacement of a motion
//! parameter file, optionally caching the series in a directory.
//!
//! Usage: `motion_fd <motion.par[.gz]> [cache dir]`

extern crate fmriqc;

use std::env;

use fmriqc::cache::{get_or_compute, ArtifactKey, DirCache, Fingerprint};
use fmriqc::{FdSeries, MotionParameterTable, DEFAULT_FD_THRESHOLD_MM, DEFAULT_HEAD_RADIUS_MM};

fn compute(path: &str) -> fmriqc::Result<FdSeries> {
    MotionParameterTable::from_file(path)?.framewise_displacement(DEFAULT_HEAD_RADIUS_MM)
}

/// The cached artifact holds the series as little-endian `f64` values.
fn encode(fd: &FdSeries) -> Vec<u8> {
    fd.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
}

fn decode(bytes: &[u8]) -> FdSeries {
    let mut value = [0u8; 8];
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            value.copy_from_slice(chunk);
            f64::from_le_bytes(value)
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to motion parameter file is required");

    let fd = match args.next() {
        Some(dir) => {
            let mut cache = DirCache::new(dir).expect("Failed to open cache directory");
            let input = Fingerprint::of_file(&filename).expect("Failed to read motion file");
            let key = ArtifactKey::new("motion_fd", input).with_param("radius", DEFAULT_HEAD_RADIUS_MM);
            get_or_compute(&mut cache, &key, || compute(&filename).map(|fd| encode(&fd)))
                .map(|bytes| decode(&bytes))
        }
        None => compute(&filename),
    }
    .expect("Failed to compute framewise displacement");

    println!("frame\tfd");
    for (i, v) in fd.iter().enumerate() {
        println!("{}\t{}", i, v);
    }

    let flagged: Vec<String> = fd
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > DEFAULT_FD_THRESHOLD_MM)
        .map(|(i, _)| i.to_string())
        .collect();
    eprintln!(
        "{} frame(s) above {} mm: {}",
        flagged.len(),
        DEFAULT_FD_THRESHOLD_MM,
        flagged.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use ndarray::array;

    #[test]
    fn cached_series_decodes_to_the_same_values() {
        let fd = array![0., 2., 0.125, 1e-9];
        assert_eq!(decode(&encode(&fd)), fd);
    }
}
