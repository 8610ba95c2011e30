// src/media.rs

//! Recipe image storage
//!
//! Clients send images inline as `data:image/<ext>;base64,<payload>`. The
//! payload is decoded, checked against the declared format's signature and
//! written under the media root at `recipes/images/<sha256>.<ext>`, so
//! identical uploads share one file. Recipes store that relative path; the
//! API exposes it below the configured media URL.
//!
//! Because files are shared, a file may only be removed once no recipe row
//! references it. Writers hold [`MediaStore::lock`] from storing an image
//! until the row naming it is committed, and from counting references until
//! the file is gone.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Directory (relative to the media root) holding recipe images
pub const IMAGE_DIR: &str = "recipes/images";

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Parse the subtype of an `image/<subtype>` MIME type
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// Whether `bytes` starts with this format's signature
    fn matches(self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        }
    }
}

/// A decoded inline image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/<ext>;base64,<payload>` URL
pub fn decode_data_url(input: &str) -> Result<DecodedImage> {
    let rest = input
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| Error::Image("expected a data:image/...;base64 URL".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Image("missing ',' before the image data".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::Image("image data must be base64 encoded".to_string()))?;

    let subtype = mime
        .strip_prefix("image/")
        .ok_or_else(|| Error::Image(format!("unsupported media type '{}'", mime)))?;

    let format = ImageFormat::from_subtype(subtype)
        .ok_or_else(|| Error::Image(format!("unsupported image format '{}'", subtype)))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::Image(format!("invalid base64 data: {e}")))?;

    if bytes.is_empty() {
        return Err(Error::Image("image is empty".to_string()));
    }
    if !format.matches(&bytes) {
        return Err(Error::Image(format!(
            "data is not a valid {} image",
            format.extension()
        )));
    }

    Ok(DecodedImage { format, bytes })
}

/// Content-addressed image store rooted at the media directory
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
    /// Shared by clones
    references: Arc<Mutex<()>>,
}

impl MediaStore {
    /// Create a store; the root directory is created on first write
    pub fn new<P: AsRef<Path>>(root: P, url_prefix: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            references: Arc::new(Mutex::new(())),
        }
    }

    /// Serialize image reference changes against removals
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.references
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an image and return its storage-relative path
    ///
    /// Storing the same content twice is a no-op returning the same path.
    pub fn store(&self, image: &DecodedImage) -> Result<String> {
        let hash = hex::encode(Sha256::digest(&image.bytes));
        let relative = format!("{}/{}.{}", IMAGE_DIR, hash, image.format.extension());
        let path = self.root.join(&relative);

        if path.exists() {
            debug!("Image already stored: {}", relative);
            return Ok(relative);
        }

        let dir = self.root.join(IMAGE_DIR);
        fs::create_dir_all(&dir)?;

        // Write to a temp file in the same directory, then rename into place
        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(&image.bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        debug!("Stored image {} ({} bytes)", relative, image.bytes.len());
        Ok(relative)
    }

    /// Decode a data URL and store it
    pub fn store_data_url(&self, data_url: &str) -> Result<String> {
        self.store(&decode_data_url(data_url)?)
    }

    /// Public URL of a stored image
    pub fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative)
    }

    /// Delete a stored image; returns whether a file was removed
    pub fn remove(&self, relative: &str) -> Result<bool> {
        let Some(path) = self.resolve(relative) else {
            return Ok(false);
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed image {}", relative);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a relative path into the image directory, rejecting anything else
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        let inside = path.starts_with(IMAGE_DIR)
            && path.components().all(|c| matches!(c, Component::Normal(_)));
        inside.then(|| self.root.join(path))
    }
}
