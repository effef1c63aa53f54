use std::fs;
use std::time::Instant;

use camino::Utf8Path;

use crate::error::ClearError;
use crate::utils::as_overhead;

/// Delete the output directory if it exists and create it again, empty.
pub fn clear_dist(dist: &Utf8Path) -> Result<(), ClearError> {
    let s = Instant::now();

    if fs::metadata(dist).is_ok() {
        fs::remove_dir_all(dist) //
            .map_err(ClearError::RemoveError)?;
    }

    fs::create_dir_all(dist) //
        .map_err(ClearError::CreateError)?;

    tracing::info!("Cleaned {dist} {}", as_overhead(s));

    Ok(())
}

/// Create or overwrite `path`, creating missing parent directories.
pub fn write_file(path: &Utf8Path, data: impl AsRef<[u8]>) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}
