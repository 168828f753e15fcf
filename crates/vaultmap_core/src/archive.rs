//! Archival export of entry directories.
//!
//! Packs an entire [`DirBackend`](crate::DirBackend) directory into a
//! gzip'd tar archive. This is a convenience over the storage layout, not
//! part of the mapping engine: the archive contains the encrypted entry
//! files exactly as they sit on disk.

use crate::error::CoreResult;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Archives `src` (a directory) into a gzip'd tarball at `dest`.
///
/// The directory appears in the archive under its own name, so unpacking
/// recreates it as a sibling of the archive.
///
/// # Errors
///
/// Returns an error if the source cannot be read or the archive cannot be
/// written.
pub fn archive_directory(src: &Path, dest: &Path) -> CoreResult<()> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let arcname = src.file_name().map(Path::new).unwrap_or(src);
    builder.append_dir_all(arcname, src)?;

    let encoder = builder.into_inner()?;
    let file = encoder.finish()?;
    file.sync_all()?;

    info!(src = %src.display(), dest = %dest.display(), "exported archive");
    Ok(())
}
