//! Unit tests for the image ingestion pipeline.
//!
//! Adapters are mocked; the image bytes are real encoded JPEG/PNG data so
//! decode, resize, and re-encode behaviour is exercised for genuine inputs.

use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgb, RgbImage};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockAssetStore, MockImageFetcher};

fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 40])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode test image");
    buf.into_inner()
}

fn fetcher_returning(bytes: Vec<u8>) -> MockImageFetcher {
    let mut fetcher = MockImageFetcher::new();
    fetcher
        .expect_fetch()
        .times(1)
        .returning(move |_| Ok(bytes.clone()));
    fetcher
}

type WriteCapture = Arc<Mutex<Option<(String, Vec<u8>)>>>;

fn capturing_assets() -> (MockAssetStore, WriteCapture) {
    let captured: WriteCapture = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let mut assets = MockAssetStore::new();
    assets.expect_write().times(1).returning(move |name, bytes| {
        *sink.lock().expect("capture lock") = Some((name.to_owned(), bytes.to_vec()));
        Ok(())
    });
    (assets, captured)
}

fn ingestor(fetcher: MockImageFetcher, assets: MockAssetStore) -> ImageIngestor<MockImageFetcher, MockAssetStore> {
    ImageIngestor::new(Arc::new(fetcher), Arc::new(assets))
}

#[rstest]
#[case("https://example.test/cat.gif")]
#[case("https://example.test/cat.jpeg")]
#[case("https://example.test/cat")]
#[case("not a url at all.webp")]
fn unsupported_extensions_are_rejected_before_any_fetch(#[case] url: &str) {
    // No expectations: touching the fetcher or the store would panic.
    let service = ingestor(MockImageFetcher::new(), MockAssetStore::new());
    let err = futures::executor::block_on(service.ingest(url)).expect_err("rejected");
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[actix_rt::test]
async fn oversized_jpeg_is_bounded_to_the_thumbnail_box() {
    let fetcher = fetcher_returning(encoded_image(600, 1000, ImageFormat::Jpeg));
    let (assets, captured) = capturing_assets();

    let asset = ingestor(fetcher, assets)
        .ingest("https://example.test/big.jpg")
        .await
        .expect("ingest succeeds");

    assert!(asset.filename.ends_with(".jpg"));
    assert_eq!(asset.filename, format!("{}.jpg", asset.post_id.simple()));

    let (stored_name, stored_bytes) = captured
        .lock()
        .expect("capture lock")
        .take()
        .expect("one write happened");
    assert_eq!(stored_name, asset.filename);

    let stored = image::load_from_memory_with_format(&stored_bytes, ImageFormat::Jpeg)
        .expect("stored asset decodes as jpeg");
    assert_eq!((stored.width(), stored.height()), (300, 500));
}

#[actix_rt::test]
async fn wide_image_keeps_its_aspect_ratio() {
    let fetcher = fetcher_returning(encoded_image(1000, 600, ImageFormat::Png));
    let (assets, captured) = capturing_assets();

    ingestor(fetcher, assets)
        .ingest("https://example.test/wide.png")
        .await
        .expect("ingest succeeds");

    let (_, stored_bytes) = captured
        .lock()
        .expect("capture lock")
        .take()
        .expect("one write happened");
    let stored = image::load_from_memory_with_format(&stored_bytes, ImageFormat::Png)
        .expect("stored asset decodes as png");
    // Width is the binding constraint: 1000x600 scales to 300x180.
    assert_eq!((stored.width(), stored.height()), (300, 180));
}

#[actix_rt::test]
async fn small_image_passes_through_unresized() {
    let fetcher = fetcher_returning(encoded_image(120, 80, ImageFormat::Png));
    let (assets, captured) = capturing_assets();

    ingestor(fetcher, assets)
        .ingest("https://example.test/icon.png")
        .await
        .expect("ingest succeeds");

    let (_, stored_bytes) = captured
        .lock()
        .expect("capture lock")
        .take()
        .expect("one write happened");
    let stored = image::load_from_memory_with_format(&stored_bytes, ImageFormat::Png)
        .expect("stored asset decodes as png");
    assert_eq!((stored.width(), stored.height()), (120, 80));
}

#[actix_rt::test]
async fn mismatched_content_fails_decode_and_writes_nothing() {
    // The extension is trusted, so JPEG bytes behind a .png URL must fail.
    let fetcher = fetcher_returning(encoded_image(64, 64, ImageFormat::Jpeg));
    let assets = MockAssetStore::new();

    let err = ingestor(fetcher, assets)
        .ingest("https://example.test/lying.png")
        .await
        .expect_err("decode fails");
    assert!(matches!(err, IngestError::DecodeFailed { .. }));
}

#[actix_rt::test]
async fn corrupt_bytes_fail_decode() {
    let fetcher = fetcher_returning(vec![0u8; 32]);
    let err = ingestor(fetcher, MockAssetStore::new())
        .ingest("https://example.test/broken.jpg")
        .await
        .expect_err("decode fails");
    assert!(matches!(err, IngestError::DecodeFailed { .. }));
}

#[actix_rt::test]
async fn fetch_failure_is_terminal() {
    let mut fetcher = MockImageFetcher::new();
    fetcher
        .expect_fetch()
        .times(1)
        .returning(|_| Err(FetchError::Status { status: 404 }));

    let err = ingestor(fetcher, MockAssetStore::new())
        .ingest("https://example.test/gone.jpg")
        .await
        .expect_err("fetch fails");
    assert_eq!(
        err,
        IngestError::FetchFailed {
            source: FetchError::Status { status: 404 }
        }
    );
}

#[actix_rt::test]
async fn write_failure_surfaces_as_storage_failed() {
    let fetcher = fetcher_returning(encoded_image(64, 64, ImageFormat::Jpeg));
    let mut assets = MockAssetStore::new();
    assets
        .expect_write()
        .times(1)
        .returning(|name, _| Err(AssetStoreError::io(name, "disk full")));

    let err = ingestor(fetcher, assets)
        .ingest("https://example.test/full.jpg")
        .await
        .expect_err("write fails");
    assert!(matches!(err, IngestError::StorageFailed { .. }));
}

#[rstest]
fn remove_asset_delegates_to_the_store() {
    let mut assets = MockAssetStore::new();
    assets
        .expect_remove()
        .times(1)
        .returning(|_| Ok(()));

    let service = ingestor(MockImageFetcher::new(), assets);
    service.remove_asset("feed0bac.jpg").expect("removal succeeds");
}
