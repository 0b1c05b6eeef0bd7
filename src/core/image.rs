use image::{DynamicImage, GenericImageView, ImageError, ImageReader};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

impl ImageLoadError {
    pub fn path(&self) -> &Path {
        match self {
            ImageLoadError::Io { path, .. } | ImageLoadError::Decode { path, .. } => path,
        }
    }
}

/// What we keep about an image once its pixels have been fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl ImageRecord {
    /// Read file metadata and decode the image behind `path`.
    ///
    /// Only a failed metadata lookup is reported as [`ImageLoadError::Io`];
    /// opening, reading and decoding failures are all [`ImageLoadError::Decode`].
    ///
    /// The decoded image is handed back separately so the caller can drop the
    /// pixel buffer as soon as it has been hashed.
    pub fn open(path: &Path) -> Result<(Self, DynamicImage), ImageLoadError> {
        let metadata = fs::metadata(path).map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // A file that exists but cannot be opened or read counts as undecodable.
        let decode_error = |source| ImageLoadError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let image = ImageReader::open(path)
            .map_err(ImageError::IoError)
            .map_err(decode_error)?
            .with_guessed_format()
            .map_err(ImageError::IoError)
            .map_err(decode_error)?
            .decode()
            .map_err(decode_error)?;

        let (width, height) = image.dimensions();
        let record = ImageRecord {
            path: path.to_path_buf(),
            width,
            height,
            size_bytes: metadata.len(),
        };

        Ok((record, image))
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }
}
