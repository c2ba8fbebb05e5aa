use std::cell::Cell;

use fmriqc::cache::{get_or_compute, ArtifactCache, ArtifactKey, DirCache, Fingerprint, MemoryCache};
use fmriqc::QcError;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn key(tool: &str, input: &[u8]) -> ArtifactKey {
    ArtifactKey::new(tool, Fingerprint::of_bytes(input)).with_param("radius", 50.)
}

#[test]
fn memory_cache_computes_once() {
    let mut cache = MemoryCache::new();
    let calls = Cell::new(0);
    let k = key("fd", b"motion");
    for _ in 0..3 {
        let artifact = get_or_compute(&mut cache, &k, || {
            calls.set(calls.get() + 1);
            Ok(b"0\n2\n".to_vec())
        })
        .unwrap();
        assert_eq!(artifact, b"0\n2\n".to_vec());
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.len(), 1);

    let _ = get_or_compute(&mut cache, &key("fd", b"other motion"), || Ok(vec![])).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn failed_compute_stores_nothing() {
    let mut cache = MemoryCache::new();
    let k = key("fd", b"motion");
    let res = get_or_compute(&mut cache, &k, || Err(QcError::EmptyInput));
    assert!(matches!(res, Err(QcError::EmptyInput)));
    assert!(cache.is_empty());
    assert_eq!(cache.load(&k).unwrap(), None);
}

#[test]
fn dir_cache_persists() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("cache");
    let k = key("mc/flirt", b"bold");
    {
        let mut cache = DirCache::new(&root).unwrap();
        assert_eq!(cache.load(&k).unwrap(), None);
        cache.store(&k, b"artifact").unwrap();
    }

    let mut cache = DirCache::new(&root).unwrap();
    let path = cache.path_for(&k);
    assert!(path.starts_with(&root));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name, format!("mc_flirt-{}.bin", k.digest()));

    let artifact = get_or_compute(&mut cache, &k, || panic!("should be cached")).unwrap();
    assert_eq!(artifact, b"artifact".to_vec());
}

#[test]
fn dir_cache_overwrites() {
    let dir = tempdir().unwrap();
    let mut cache = DirCache::new(dir.path()).unwrap();
    let k = key("fd", b"motion");
    cache.store(&k, b"old").unwrap();
    cache.store(&k, b"new").unwrap();
    assert_eq!(cache.load(&k).unwrap(), Some(b"new".to_vec()));
    // no temporary file left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn file_fingerprint_follows_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.par");
    std::fs::write(&path, b"0 0 0 0 0 0\n").unwrap();
    let a = Fingerprint::of_file(&path).unwrap();
    assert_eq!(a, Fingerprint::of_bytes(b"0 0 0 0 0 0\n"));
    std::fs::write(&path, b"0 0 0 0 0 1\n").unwrap();
    assert_ne!(Fingerprint::of_file(&path).unwrap(), a);
}
