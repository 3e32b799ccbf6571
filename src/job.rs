//! One thumbnail job, from source bytes to delivered artifacts.
//!
//! A job decodes the fetched image once, runs the imaging pipeline for each
//! requested size, and hands every artifact to its [`Destination`]: written
//! into a directory, or uploaded to an [`ObjectStore`].

use crate::fetch::{FetchError, SourceImage};
use crate::imaging::{Codec, ImagingError, OutputFormat, Quality, SizeSpec, process};
use crate::naming::artifact_name;
use crate::storage::{ObjectStore, StorageError};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Imaging error: {0}")]
    Imaging(#[from] ImagingError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Two sizes would both be saved as {0}")]
    DuplicateName(String),
}

/// Pick the size spec for a single-size request.
///
/// A scale with no width or height means [`SizeSpec::Scale`]; a width or
/// height with no scale means [`SizeSpec::Dimensions`] (the missing side is
/// derived). Zero counts as absent. Nothing at all, or both kinds at once,
/// falls back to [`SizeSpec::Original`].
pub fn select_size_spec(
    scale: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<SizeSpec, ImagingError> {
    let scale = scale.filter(|s| *s != 0.0);
    let width = width.unwrap_or(0);
    let height = height.unwrap_or(0);
    let has_dimensions = width != 0 || height != 0;

    match scale {
        Some(factor) if !has_dimensions => SizeSpec::scale(factor),
        None if has_dimensions => SizeSpec::dimensions(width, height),
        _ => Ok(SizeSpec::Original),
    }
}

/// Where artifacts end up.
pub enum Destination<'a> {
    /// Write `dir/name` for every artifact.
    Directory(PathBuf),
    /// Upload to `store` at `key_prefix/name`.
    Upload {
        store: &'a dyn ObjectStore,
        key_prefix: String,
    },
}

/// Everything needed to process one source image.
pub struct Job<'a> {
    pub specs: Vec<SizeSpec>,
    pub quality: Quality,
    pub format: OutputFormat,
    pub destination: Destination<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Url(String),
}

/// Record of one delivered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub location: Location,
}

/// Fail if two specs would produce the same artifact name, since the second
/// delivery would overwrite the first.
fn check_unique_names(job: &Job<'_>, base_name: &str) -> Result<(), JobError> {
    let mut seen = HashSet::new();
    for spec in &job.specs {
        let name = artifact_name(spec, job.quality, base_name);
        if !seen.insert(name.clone()) {
            return Err(JobError::DuplicateName(name));
        }
    }
    Ok(())
}

/// Decode `source`, process it for every spec, and deliver the results.
///
/// Artifacts are delivered in spec order. Duplicate artifact names are
/// rejected up front. Processing completes before the first delivery, so an
/// imaging error leaves nothing behind; a delivery error stops at the
/// failing artifact.
pub fn run(
    codec: &impl Codec,
    job: &Job<'_>,
    source: SourceImage,
) -> Result<Vec<Delivered>, JobError> {
    check_unique_names(job, &source.base_name)?;

    let image = codec.decode(&source.bytes)?;
    log::debug!(
        "decoded {}: {}x{}",
        source.base_name,
        image.width(),
        image.height()
    );

    let artifacts = process(
        codec,
        &image,
        &source.base_name,
        &job.specs,
        job.quality,
        job.format,
    )?;

    if let Destination::Directory(dir) = &job.destination {
        fs::create_dir_all(dir)?;
    }

    let mut delivered = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let size = artifact.bytes.len();
        let location = match &job.destination {
            Destination::Directory(dir) => {
                let path = dir.join(&artifact.name);
                fs::write(&path, &artifact.bytes)?;
                log::info!("wrote {} ({size} bytes)", path.display());
                Location::File(path)
            }
            Destination::Upload { store, key_prefix } => Location::Url(store.upload(
                key_prefix,
                artifact.bytes,
                &artifact.name,
                artifact.format.mime_type(),
            )?),
        };

        delivered.push(Delivered {
            name: artifact.name,
            width: artifact.width,
            height: artifact.height,
            bytes: size,
            location,
        });
    }

    Ok(delivered)
}
