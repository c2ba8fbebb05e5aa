//! Private utility module
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Result;

/// Check whether the given path refers to a Gzip compressed file,
/// judging by its extension alone.
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// Open a file for buffered reading. If the file's name ends with ".gz",
/// the contents are decoded as a Gzip stream.
pub fn open_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let gz = is_gz_file(&path);
    let file = BufReader::new(File::open(path)?);
    if gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// Create a file and hand a writer over to `write`. If the file's name ends
/// with ".gz", the output is Gzip compressed.
pub fn write_maybe_gz<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let gz = is_gz_file(&path);
    let mut writer = BufWriter::new(File::create(path)?);
    if gz {
        let mut e = GzEncoder::new(writer, Compression::default());
        write(&mut e)?;
        e.finish()?.flush()?;
    } else {
        write(&mut writer)?;
        writer.flush()?;
    }
    Ok(())
}
