//! Export of finished stories: PNG file objects and their delivery.
//!
//! Delivery tries, in order: a share sheet that accepts file attachments, a
//! text-only share (the file is still written so it can be attached by
//! hand), and finally a plain download with a notice telling the user to
//! share from their gallery.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::render::Surface;

pub const DAILY_FILE_NAME: &str = "menu-du-jour.png";
pub const WEEKLY_FILE_NAME: &str = "plats-de-la-semaine.png";

pub const SHARE_TITLE: &str = "Menu du jour";
pub const SHARE_TEXT: &str = "Voici le menu du jour du restaurant";

/// Shown after falling back to a download.
pub const DOWNLOAD_NOTICE: &str = "Ton téléphone ne permet pas de partager l'image directement. \
     L'image a été téléchargée : tu peux maintenant la partager depuis ta galerie.";

/// A named binary file ready to hand to a share sheet or write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Encode `surface` as PNG under `name`.
    pub fn png(name: &str, surface: &Surface) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            mime: "image/png",
            bytes: surface.encode_png()?,
        })
    }
}

/// Platform share facility.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    fn can_share_files(&self, file: &ExportFile) -> bool;
    fn can_share_text(&self) -> bool;
    async fn share_files(&self, file: &ExportFile, title: &str, text: &str) -> Result<()>;
    async fn share_text(&self, title: &str, text: &str) -> Result<()>;
}

/// No share facility at all; every delivery becomes a download.
pub struct NoShareSheet;

#[async_trait]
impl ShareSheet for NoShareSheet {
    fn can_share_files(&self, _file: &ExportFile) -> bool {
        false
    }

    fn can_share_text(&self) -> bool {
        false
    }

    async fn share_files(&self, _file: &ExportFile, _title: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn share_text(&self, _title: &str, _text: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the share sheet as an attachment.
    SharedFile,
    /// Text shared; the image was written to `path` alongside.
    SharedText { path: PathBuf },
    /// Written to `path`; `notice` should be shown to the user.
    Downloaded { path: PathBuf, notice: &'static str },
}

/// Write `file` into `dir` under its own name.
pub fn download(file: &ExportFile, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&file.name);
    std::fs::write(&path, &file.bytes)?;
    log::info!("Wrote {} ({} bytes)", path.display(), file.bytes.len());
    Ok(path)
}

/// Deliver `file` through `sheet`, falling back to a download into `dir`.
///
/// A share that fails is logged and treated like an unavailable one. Only a
/// failed download is an error.
pub async fn deliver(file: &ExportFile, sheet: &dyn ShareSheet, dir: &Path) -> Result<Delivery> {
    if sheet.can_share_files(file) {
        match sheet.share_files(file, SHARE_TITLE, SHARE_TEXT).await {
            Ok(()) => return Ok(Delivery::SharedFile),
            Err(e) => log::warn!("File share failed, falling back: {}", e),
        }
    }

    if sheet.can_share_text() {
        match sheet.share_text(SHARE_TITLE, SHARE_TEXT).await {
            Ok(()) => {
                let path = download(file, dir)?;
                return Ok(Delivery::SharedText { path });
            }
            Err(e) => log::warn!("Text share failed, falling back: {}", e),
        }
    }

    let path = download(file, dir)?;
    Ok(Delivery::Downloaded {
        path,
        notice: DOWNLOAD_NOTICE,
    })
}
