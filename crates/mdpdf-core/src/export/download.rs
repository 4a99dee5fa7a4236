//! Saving exported files into a download directory
//!
//! Existing files are never overwritten. When the requested name is taken the
//! file is saved as `name (1).pdf`, `name (2).pdf`, and so on.

use crate::{Error, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Give up after this many taken names
const MAX_ATTEMPTS: u32 = 10_000;

/// A directory finished exports are written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDir {
    dir: PathBuf,
}

impl DownloadDir {
    /// The user's download folder, or the working directory if there is none
    pub fn user_default() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path tried on the `attempt`th save of `filename`, counting from zero
    pub fn candidate(&self, filename: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return self.dir.join(filename);
        }
        let name = Path::new(filename);
        let stem = name
            .file_stem()
            .map_or_else(|| filename.to_string(), |s| s.to_string_lossy().to_string());
        let numbered = match name.extension() {
            Some(ext) => format!("{stem} ({attempt}).{}", ext.to_string_lossy()),
            None => format!("{stem} ({attempt})"),
        };
        self.dir.join(numbered)
    }

    /// Write `bytes` under the first free variant of `filename`
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        for attempt in 0..MAX_ATTEMPTS {
            let path = self.candidate(filename, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_discard(&path, file, bytes)?;
                    info!("Saved {} ({} bytes)", path.display(), bytes.len());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Export(format!(
            "no free file name for {} in {}",
            filename,
            self.dir.display()
        )))
    }
}

/// Write `bytes` to the freshly created `path`, removing it if the write fails
///
/// A partial file would otherwise hold the name for every later save.
fn write_or_discard(path: &Path, mut file: impl Write, bytes: &[u8]) -> Result<()> {
    let written = file.write_all(bytes).and_then(|()| file.flush());
    drop(file);
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(path) {
            warn!("Could not remove partial {}: {}", path.display(), cleanup);
        }
        return Err(e.into());
    }
    Ok(())
}

impl Default for DownloadDir {
    fn default() -> Self {
        Self::user_default()
    }
}
