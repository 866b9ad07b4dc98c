// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Immutable image artifacts produced by uploads, generations and crops.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use uuid::Uuid;

use crate::utils::hash_bytes;

/// A stored image version. Cloning shares the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    id: Uuid,
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
    sha256: String,
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Artifact {
    /// Wrap raw encoded image bytes.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        let sha256 = hash_bytes(&bytes);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
            sha256,
        }
    }

    /// Read an image file from disk.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or its extension does not map to an
    /// `image/*` MIME type.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        if !mime.starts_with("image/") {
            bail!("Not an image file: {} ({mime})", path.display());
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(name, mime, bytes))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    ///
    /// # Errors
    ///
    /// Fails fast on a missing comma separator, a header without a MIME type,
    /// or a payload that is not valid base64.
    pub fn from_data_url(url: &str, name: impl Into<String>) -> Result<Self> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| anyhow!("Invalid data URL"))?;
        let mime = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| anyhow!("Could not parse MIME type from data URL"))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .context("Data URL payload is not valid base64")?;
        Ok(Self::new(name, mime, bytes))
    }

    /// Encode as a base64 data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Base64 payload without the data URL header.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Decode the stored bytes into a pixel buffer.
    pub fn decode(&self) -> Result<DynamicImage> {
        image::load_from_memory(&self.bytes)
            .with_context(|| format!("Failed to decode image '{}'", self.name))
    }

    /// Native pixel dimensions (width, height).
    #[cfg(test)]
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        use image::GenericImageView;
        Ok(self.decode()?.dimensions())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex SHA-256 digest of the encoded bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// File extension matching the MIME type, defaulting to `png`.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime)
    }
}

/// Preferred file extension for an image MIME type, defaulting to `png`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    mime_guess::get_mime_extensions_str(mime)
        .and_then(|exts| {
            exts.iter()
                .copied()
                .find(|e| matches!(*e, "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp"))
                .or_else(|| exts.first().copied())
        })
        .unwrap_or("png")
}

/// Encode a pixel buffer as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(out.into_inner())
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Artifact {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let bytes = encode_png(&DynamicImage::ImageRgba8(img)).unwrap();
    Artifact::new("sample.png", "image/png", bytes)
}
