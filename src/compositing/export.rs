use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;

pub const EXPORT_MIME: &str = "image/png";

/// An encoded meme ready to be downloaded or written out.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

impl ExportArtifact {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            filename: unique_filename(),
            width,
            height,
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", EXPORT_MIME, STANDARD.encode(&self.bytes))
    }

    /// Writes to a hidden temp file in `dir` and renames it into place, so a
    /// failed write never leaves a partial PNG under the final name.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let target = dir.join(&self.filename);
        let staging = dir.join(format!(".{}.part", self.filename));

        if let Err(e) = fs::write(&staging, &self.bytes) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        fs::rename(&staging, &target)?;

        log::debug!("Wrote {}", target.display());
        Ok(target)
    }
}

/// `meme-<UTC yyyymmdd-HHMMSS>-<8 hex>.png`
pub fn unique_filename() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "meme-{}-{}.png",
        Utc::now().format("%Y%m%d-%H%M%S"),
        &suffix[..8]
    )
}
