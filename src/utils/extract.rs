use crate::error::InstallError;
use crate::options::verbose;
use anyhow::Result;
use std::fs;
use std::io;
use std::path::Path;

/// Unpacks a gzip-compressed tarball into `extract_dir`.
pub fn extract_archive(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    extract_tar_gz(archive_path, extract_dir)
        .map_err(|e| InstallError::extraction(archive_path, e))?;
    Ok(())
}

/// Extracts the archive, then deletes it.
pub fn extract_and_remove(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    extract_archive(archive_path, extract_dir)?;
    fs::remove_file(archive_path).map_err(|e| InstallError::extraction(archive_path, e))?;
    verbose::log(&format!("Removed {}", archive_path.display()));
    Ok(())
}

fn extract_tar_gz(archive_path: &Path, extract_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(extract_dir)?;
    let file = fs::File::open(archive_path)?;
    let decompressed = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decompressed);

    archive.unpack(extract_dir)
}
