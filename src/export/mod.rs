use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "mask.png";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode mask png: {0}")]
    Encode(#[from] image::ImageError),
    #[error("export file name is empty or not a plain file name: {0:?}")]
    InvalidFileName(String),
    #[error("io error while writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Destination for an exported mask, the "save as file" side effect.
pub trait MaskSink {
    fn deliver(&self, file_name: &str, png: &[u8]) -> ExportResult<PathBuf>;
}

/// Encode a mask as RGBA8 PNG. Identical input always yields identical bytes.
pub fn encode_png(mask: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        mask.as_raw(),
        mask.width(),
        mask.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Writes exports into one directory, overwriting earlier files of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn target_path(&self, file_name: &str) -> ExportResult<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.dir.join(file_name))
    }
}

impl MaskSink for DirectorySink {
    fn deliver(&self, file_name: &str, png: &[u8]) -> ExportResult<PathBuf> {
        let path = self.target_path(file_name)?;
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, png).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = png.len(), "mask exported");
        Ok(path)
    }
}

fn validate_file_name(file_name: &str) -> ExportResult<()> {
    let plain = Path::new(file_name)
        .file_name()
        .is_some_and(|name| name == file_name);
    if file_name.is_empty() || !plain {
        return Err(ExportError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

/// Keeps deliveries in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub(crate) delivered: std::cell::RefCell<Vec<(String, Vec<u8>)>>,
}

#[cfg(test)]
impl MaskSink for MemorySink {
    fn deliver(&self, file_name: &str, png: &[u8]) -> ExportResult<PathBuf> {
        self.delivered
            .borrow_mut()
            .push((file_name.to_string(), png.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}
