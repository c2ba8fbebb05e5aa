//! Content-addressed caching of expensive artifacts.
//!
//! Preprocessing runs repeatedly produce the same outputs from the same
//! inputs: a motion-corrected series, a brain mask, a table of nuisance
//! regressors. Rather than checking whether some output file happens to
//! exist, artifacts are keyed by the producing tool, a fingerprint of the
//! input contents and the parameters used, so that a change in any of them
//! results in a different key.
//!
//! The cache is owned by the caller and sits around the computations of
//! this crate; none of the metric functions read or write a cache.
//!
//! # Example
//!
//! ```
//! use fmriqc::cache::{get_or_compute, ArtifactKey, Fingerprint, MemoryCache};
//!
//! let mut cache = MemoryCache::new();
//! let key = ArtifactKey::new("fd", Fingerprint::of_bytes(b"0 0 0 0 0 0\n"))
//!     .with_param("radius", "50");
//! let first = get_or_compute(&mut cache, &key, || Ok(b"0\n".to_vec()))?;
//! let again = get_or_compute(&mut cache, &key, || unreachable!())?;
//! assert_eq!(first, again);
//! # Ok::<(), fmriqc::QcError>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crc::{Crc, CRC_64_ECMA_182};
use ndarray::{ArrayBase, Data, Dimension};
use tracing::debug;

use crate::error::Result;

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);

/// A CRC-64 digest of some content.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a byte buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Fingerprint(CRC64.checksum(bytes))
    }

    /// Fingerprint the contents of a file, as stored on disk.
    pub fn of_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut digest = CRC64.digest();
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            digest.update(&buf[..n]);
        }
        Ok(Fingerprint(digest.finalize()))
    }

    /// Fingerprint an array of intensities, including its shape. Values are
    /// visited in logical order, so the memory layout does not matter.
    pub fn of_array<S, D>(array: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let mut digest = CRC64.digest();
        for len in array.shape() {
            digest.update(&(*len as u64).to_le_bytes());
        }
        for v in array.iter() {
            digest.update(&v.to_le_bytes());
        }
        Fingerprint(digest.finalize())
    }

    /// The raw digest value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The digest as 16 lowercase hexadecimal digits.
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The identity of a cached artifact: the tool which produced it, the
/// fingerprint of its input, and the parameters given to the tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    tool: String,
    input: Fingerprint,
    params: BTreeMap<String, String>,
}

impl ArtifactKey {
    /// Create a key without parameters.
    pub fn new<T: Into<String>>(tool: T, input: Fingerprint) -> Self {
        ArtifactKey {
            tool: tool.into(),
            input,
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter to the key. Parameters are kept sorted by name, so
    /// the order in which they are added does not change the key. Adding a
    /// parameter twice keeps the last value.
    pub fn with_param<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let _ = self.params.insert(name.into(), value.to_string());
        self
    }

    /// The producing tool.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The input fingerprint.
    pub fn input(&self) -> Fingerprint {
        self.input
    }

    /// A single fingerprint over the tool, input and parameters.
    pub fn digest(&self) -> Fingerprint {
        let mut digest = CRC64.digest();
        digest.update(self.tool.as_bytes());
        digest.update(&[0]);
        digest.update(&self.input.0.to_le_bytes());
        for (name, value) in &self.params {
            digest.update(name.as_bytes());
            digest.update(&[0]);
            digest.update(value.as_bytes());
            digest.update(&[0]);
        }
        Fingerprint(digest.finalize())
    }
}

/// Storage for artifacts, addressed by key.
pub trait ArtifactCache {
    /// Fetch the artifact stored under `key`, if any.
    fn load(&self, key: &ArtifactKey) -> Result<Option<Vec<u8>>>;

    /// Store an artifact under `key`, replacing any previous one.
    fn store(&mut self, key: &ArtifactKey, artifact: &[u8]) -> Result<()>;
}

/// Retrieve the artifact stored under `key`, or produce it with `compute`
/// and store it.
///
/// If `compute` fails, nothing is stored and its error is returned.
pub fn get_or_compute<C, F>(cache: &mut C, key: &ArtifactKey, compute: F) -> Result<Vec<u8>>
where
    C: ArtifactCache + ?Sized,
    F: FnOnce() -> Result<Vec<u8>>,
{
    if let Some(artifact) = cache.load(key)? {
        debug!(tool = key.tool(), key = %key.digest(), "artifact cache hit");
        return Ok(artifact);
    }
    debug!(tool = key.tool(), key = %key.digest(), "artifact cache miss");
    let artifact = compute()?;
    cache.store(key, &artifact)?;
    Ok(artifact)
}

/// An artifact cache held in memory for the lifetime of the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: HashMap<ArtifactKey, Vec<u8>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no artifact.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArtifactCache for MemoryCache {
    fn load(&self, key: &ArtifactKey) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &ArtifactKey, artifact: &[u8]) -> Result<()> {
        let _ = self.entries.insert(key.clone(), artifact.to_vec());
        Ok(())
    }
}

/// An artifact cache persisted in a directory, one file per artifact.
///
/// Files are named `<tool>-<digest>.bin`, with any character of the tool
/// name outside `[A-Za-z0-9_-]` replaced by `_`.
#[derive(Debug, Clone)]
pub struct DirCache {
    root: PathBuf,
}

impl DirCache {
    /// Use the given directory as cache root, creating it if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(DirCache {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file in which the artifact of `key` is stored.
    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        let tool: String = key
            .tool()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}-{}.bin", tool, key.digest()))
    }
}

impl ArtifactCache for DirCache {
    fn load(&self, key: &ArtifactKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, key: &ArtifactKey, artifact: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        // written aside first so a reader never sees a partial artifact
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, artifact)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = artifact.len(), "artifact stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtifactKey, Fingerprint};
    use ndarray::{array, Array2, ShapeBuilder};

    #[test]
    fn param_order_does_not_matter() {
        let input = Fingerprint::of_bytes(b"abc");
        let a = ArtifactKey::new("mcflirt", input)
            .with_param("cost", "normcorr")
            .with_param("dof", 6);
        let b = ArtifactKey::new("mcflirt", input)
            .with_param("dof", 6)
            .with_param("cost", "normcorr");
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());

        let c = a.clone().with_param("dof", 12);
        assert_ne!(a.digest(), c.digest());
        let d = ArtifactKey::new("flirt", input)
            .with_param("cost", "normcorr")
            .with_param("dof", 6);
        assert_ne!(a.digest(), d.digest());
    }

    #[test]
    fn array_fingerprint_ignores_layout() {
        let c = array![[1., 2., 3.], [4., 5., 6.]];
        let mut f = Array2::zeros((2, 3).f());
        f.assign(&c);
        assert_eq!(Fingerprint::of_array(&c), Fingerprint::of_array(&f));
        let t = c.t().to_owned();
        assert_ne!(Fingerprint::of_array(&c), Fingerprint::of_array(&t));
    }

    #[test]
    fn hex() {
        let fp = Fingerprint::of_bytes(b"123456789");
        assert_eq!(fp.to_hex().len(), 16);
        assert_eq!(fp.to_string(), fp.to_hex());
        // CRC-64/ECMA-182 check value
        assert_eq!(fp.value(), 0x6c40df5f0b497347);
    }
}
