//! Image ingestion pipeline.
//!
//! Turns a user-supplied image URL into a validated, re-encoded, size-bounded
//! asset in the uploads directory. The format is taken strictly from the URL
//! extension and is trusted, not sniffed from content; that fragility is a
//! documented policy decision, so a `.png` URL serving JPEG bytes fails with
//! [`IngestError::DecodeFailed`] rather than being silently accepted.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::ports::{AssetStore, AssetStoreError, FetchError, ImageFetcher};
use super::post::PostId;

#[cfg(test)]
mod tests;

/// Maximum thumbnail width in pixels.
pub const MAX_THUMB_WIDTH: u32 = 300;
/// Maximum thumbnail height in pixels.
pub const MAX_THUMB_HEIGHT: u32 = 500;

/// Terminal failures of the ingestion pipeline. No retries are performed;
/// every variant aborts the triggering submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The single fetch attempt failed.
    #[error("image fetch failed: {source}")]
    FetchFailed {
        #[from]
        source: FetchError,
    },
    /// The URL does not end in one of the accepted extensions.
    #[error("unsupported image format: {url}")]
    UnsupportedFormat { url: String },
    /// The fetched bytes did not decode as the format the extension implies.
    #[error("image decode failed: {message}")]
    DecodeFailed { message: String },
    /// Encoding or writing the thumbnail failed.
    #[error("asset storage failed: {message}")]
    StorageFailed { message: String },
}

impl IngestError {
    fn storage(message: impl std::fmt::Display) -> Self {
        Self::StorageFailed {
            message: message.to_string(),
        }
    }
}

impl From<AssetStoreError> for IngestError {
    fn from(err: AssetStoreError) -> Self {
        Self::storage(err)
    }
}

/// Accepted source image formats, derived from the URL extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Determine the format from the extension of the URL's path.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::ingestion::ImageKind;
    ///
    /// assert_eq!(
    ///     ImageKind::from_source_url("https://example.test/cat.jpg?s=1"),
    ///     Some(ImageKind::Jpeg)
    /// );
    /// assert_eq!(ImageKind::from_source_url("https://example.test/cat.gif"), None);
    /// ```
    #[must_use]
    pub fn from_source_url(source: &str) -> Option<Self> {
        let path = Url::parse(source)
            .map(|url| url.path().to_owned())
            .unwrap_or_else(|_| source.to_owned());
        if path.ends_with(".jpg") {
            Some(Self::Jpeg)
        } else if path.ends_with(".png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// Extension carried over to the stored asset filename.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
        }
    }

    const fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// A successfully ingested asset.
///
/// The identifier doubles as the filename stem and as the id of the post
/// that will reference the asset, keeping the two bound 1:1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub post_id: PostId,
    pub filename: String,
}

/// Ingestion service over an HTTP fetch capability and an asset store.
#[derive(Clone)]
pub struct ImageIngestor<F, A> {
    fetcher: Arc<F>,
    assets: Arc<A>,
}

impl<F, A> ImageIngestor<F, A> {
    /// Create an ingestor from its two driven adapters.
    pub fn new(fetcher: Arc<F>, assets: Arc<A>) -> Self {
        Self { fetcher, assets }
    }
}

impl<F, A> ImageIngestor<F, A>
where
    F: ImageFetcher,
    A: AssetStore,
{
    /// Fetch, decode, thumbnail, and durably store a remote image.
    ///
    /// The filename is returned only after the write has fully succeeded;
    /// callers must not create a post referencing the asset before then.
    pub async fn ingest(&self, source_url: &str) -> Result<StoredAsset, IngestError> {
        let kind =
            ImageKind::from_source_url(source_url).ok_or_else(|| IngestError::UnsupportedFormat {
                url: source_url.to_owned(),
            })?;

        let bytes = self.fetcher.fetch(source_url).await?;
        let decoded = image::load_from_memory_with_format(&bytes, kind.format()).map_err(|err| {
            IngestError::DecodeFailed {
                message: err.to_string(),
            }
        })?;
        let thumb = bounded_thumbnail(decoded);

        let mut encoded = Cursor::new(Vec::new());
        thumb
            .write_to(&mut encoded, kind.format())
            .map_err(IngestError::storage)?;

        let post_id = PostId::generate();
        let filename = format!("{}{}", post_id.simple(), kind.extension());
        self.assets.write(&filename, encoded.get_ref())?;

        debug!(%post_id, filename, source = source_url, "image asset stored");
        Ok(StoredAsset { post_id, filename })
    }

    /// Unlink a stored asset. A file that is already gone counts as removed,
    /// so retried deletions stay idempotent.
    pub fn remove_asset(&self, filename: &str) -> Result<(), IngestError> {
        self.assets.remove(filename).map_err(|err| {
            warn!(filename, error = %err, "asset removal failed");
            IngestError::from(err)
        })
    }
}

/// Bound an image to the thumbnail box, preserving aspect ratio.
///
/// Nearest-neighbour resampling is a speed-over-quality trade-off the feed
/// has always made. Images already inside the box pass through untouched.
fn bounded_thumbnail(img: DynamicImage) -> DynamicImage {
    if img.width() <= MAX_THUMB_WIDTH && img.height() <= MAX_THUMB_HEIGHT {
        return img;
    }
    img.resize(MAX_THUMB_WIDTH, MAX_THUMB_HEIGHT, FilterType::Nearest)
}
