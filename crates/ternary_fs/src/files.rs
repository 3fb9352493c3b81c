use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Maximum file size allowed for workspace reads (1 MB). Larger files are
/// never useful as prompt context and would dominate the token budget.
pub const MAX_READ_SIZE: u64 = 1024 * 1024;

/// Heuristic binary check: look for null bytes in the first 512 bytes.
pub fn is_likely_binary(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    use std::io::Read;
    let mut buf = [0u8; 512];
    let mut reader = std::io::BufReader::new(file);
    let Ok(n) = reader.read(&mut buf) else {
        return false;
    };
    buf[..n].contains(&0)
}

/// Read a workspace file as UTF-8, enforcing the size cap.
pub fn read_workspace_file(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Cannot stat file: {}", path.display()))?;

    if metadata.len() > MAX_READ_SIZE {
        bail!(
            "File too large ({} bytes, max {} bytes): {}",
            metadata.len(),
            MAX_READ_SIZE,
            path.display()
        );
    }

    debug!("Reading file: {}", path.display());
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Modification time of a file in milliseconds since the Unix epoch.
/// Returns `None` when the stat fails or the platform reports no mtime;
/// callers skip recency scoring and cache reads for such files.
pub fn file_mtime_ms(path: &Path) -> Option<u64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_millis() as u64)
}
